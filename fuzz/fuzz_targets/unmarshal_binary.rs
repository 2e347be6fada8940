#![no_main]
use libfuzzer_sys::fuzz_target;
use ubjson::AnyValue;

fuzz_target!(|data: &[u8]| {
    // Decoding must fail cleanly; anything accepted must re-encode.
    if let Ok(v) = ubjson::unmarshal::<AnyValue>(data) {
        ubjson::marshal(&v).expect("accepted value failed to re-encode");
    }
});
