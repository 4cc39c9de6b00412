#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;

use cachegrid_core::serialization::BytesObjectInput;
use cachegrid_core::{GlobalMarshaller, SerializationConfig};

fn marshaller() -> &'static GlobalMarshaller {
    static MARSHALLER: OnceLock<GlobalMarshaller> = OnceLock::new();
    MARSHALLER.get_or_init(|| {
        let marshaller = GlobalMarshaller::new(SerializationConfig::default());
        marshaller.start().expect("marshaller failed to start");
        marshaller
    })
}

fuzz_target!(|data: &[u8]| {
    let marshaller = marshaller();

    // A single value must decode or fail cleanly.
    let _ = marshaller.object_from_bytes(data);

    // Consecutive values read from one stream must never run past the end.
    let mut input = BytesObjectInput::new(data);
    while input.position() < data.len() {
        let before = input.position();
        if marshaller.object_from_stream(&mut input).is_err() || input.position() == before {
            break;
        }
    }

    // Whatever decodes must encode again.
    if let Ok(Some(value)) = marshaller.object_from_bytes(data) {
        let _ = marshaller.object_to_bytes(Some(value.as_ref()));
    }
});
