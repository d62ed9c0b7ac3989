#![no_main]

use html::{Event, VecSink, balance, is_void_element, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let mut sink = VecSink::new();
    balance(tokenize(input), &mut sink);
    let mut open: Vec<&str> = Vec::new();
    for event in &sink.events {
        match event {
            Event::Open(name, _) if !is_void_element(name) => open.push(name),
            Event::Close(name) => assert_eq!(open.pop(), Some(name.as_str())),
            _ => {}
        }
    }
    assert!(open.is_empty());
});
