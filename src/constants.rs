/// Maximum hash output length over all supported hash algorithms
pub const MAX_HASH_LEN: usize = 64;
/// Maximum cipher key length supported
pub const MAX_KEY_LEN: usize = 32;
/// Maximum cipher tag length supported
pub const MAX_TAG_LEN: usize = 16;
/// Maximum DH public/private/shared key length over all supported groups
pub const MAX_DH_LEN: usize = 32;
/// Pre-shared key length required by the Noise specification
pub const PSK_LEN: usize = 32;
/// Maximum length of a full protocol name
pub const MAX_PROTOCOL_NAME_LEN: usize = 128;
/// Maximum Noise message length
pub const MAX_MESSAGE_LEN: usize = 65535;
