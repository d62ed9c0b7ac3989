#![no_main]

use libfuzzer_sys::fuzz_target;
use sanitizer::{Policy, PolicyBuilder, Preset};
use std::sync::LazyLock;

static POLICY: LazyLock<Policy> = LazyLock::new(|| {
    [Preset::Formatting, Preset::Blocks, Preset::Links, Preset::Tables, Preset::Styles]
        .into_iter()
        .fold(PolicyBuilder::new(), PolicyBuilder::allow_preset)
        .build()
        .unwrap()
});

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let once = POLICY.sanitize(input);
    assert_eq!(POLICY.sanitize(&once), once);
});
