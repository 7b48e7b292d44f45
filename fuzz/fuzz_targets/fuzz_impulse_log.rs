#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The impulse CSV reader must reject arbitrary bytes without panicking.
    let _ = rower_config::read_impulse_csv(data);
});
