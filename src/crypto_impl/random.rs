use rand_core::{CryptoRng, RngCore};

const RNG_FAILURE_MSG: &str = "default RNG: system entropy failure";

/// Default system RNG backed by [`getrandom`]
#[derive(Default, Clone)]
pub struct DefaultRng;

impl RngCore for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).expect(RNG_FAILURE_MSG);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        getrandom::getrandom(&mut buf).expect(RNG_FAILURE_MSG);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        getrandom::getrandom(dest).expect(RNG_FAILURE_MSG);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        getrandom::getrandom(dest).map_err(|e| rand_core::Error::from(e.code()))
    }
}

// getrandom provides cryptographically secure random numbers
impl CryptoRng for DefaultRng {}
