#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(docs) = polcheck_engine::loader::parse_stream(Path::new("fuzz.yaml"), s) {
            for doc in &docs {
                let _ = doc.name();
                if let Ok(case) = doc.detect_case() {
                    // Encode and print; skip solving.
                    if let Ok(script) = polcheck_engine::encoder::encode(doc, case) {
                        let _ = script.to_smtlib();
                    }
                }
            }
        }
    }
});
