#![no_main]
use libfuzzer_sys::fuzz_target;
use ubjson::AnyValue;

fuzz_target!(|data: &[u8]| {
    if let Ok(v) = ubjson::unmarshal_block::<AnyValue>(data) {
        ubjson::marshal_block(&v).expect("accepted value failed to re-encode");
    }
});
