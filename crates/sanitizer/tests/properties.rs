use proptest::prelude::*;
use sanitizer::{Policy, PolicyBuilder, Preset};
use std::sync::LazyLock;

static RICH: LazyLock<Policy> = LazyLock::new(|| {
    [Preset::Formatting, Preset::Blocks, Preset::Links, Preset::Tables, Preset::Styles]
        .into_iter()
        .fold(PolicyBuilder::new(), PolicyBuilder::allow_preset)
        .build()
        .unwrap()
});

static TEXT_ONLY: LazyLock<Policy> = LazyLock::new(|| PolicyBuilder::new().build().unwrap());

static STYLED_URLS: LazyLock<Policy> = LazyLock::new(|| {
    PolicyBuilder::new()
        .allow_elements(["div", "span", "p"])
        .allow_styling()
        .allow_standard_url_protocols()
        .allow_urls_in_styles(|_: &str, _: &str, url: &str| Some(url.to_string()))
        .build()
        .unwrap()
});

static IMAGES: LazyLock<Policy> = LazyLock::new(|| {
    PolicyBuilder::new()
        .allow_preset(Preset::Images)
        .allow_attributes(["srcset"])
        .on_elements(["img"])
        .build()
        .unwrap()
});

static RAW_TEXT: LazyLock<Policy> = LazyLock::new(|| {
    PolicyBuilder::new()
        .allow_elements(["div", "style", "script", "title", "textarea"])
        .allow_text_in(["style", "script", "title", "textarea"])
        .build()
        .unwrap()
});

const FORBIDDEN: &[&str] = &[
    "script", "style", "iframe", "img", "svg", "textarea", "title", "xmp", "plaintext", "object",
];

fn fragment() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z <>&\"'=/!-]{0,8}",
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<i>".to_string()),
        Just("<p>".to_string()),
        Just("<table><tr><td>".to_string()),
        Just("<script>".to_string()),
        Just("</script>".to_string()),
        Just("<!--".to_string()),
        Just("-->".to_string()),
        Just("<a href='javascript:x()'>".to_string()),
        Just("<a href=http://x/ target=_blank>".to_string()),
        Just("<span style='color: red; position: fixed'>".to_string()),
        Just("&amp;&lt;&#0;&#x1F600;".to_string()),
        Just("<div style='background: url(x y.png)'>".to_string()),
        Just("<span style='background-image: image(\"a b.png\", blue)'>".to_string()),
        Just("<p style=\"background:'//evil.org/(a).png'; color: rgb(1,2,3)\">".to_string()),
        Just("<img srcset='a.png 1x, b,c.png 2w, javascript:x'>".to_string()),
        Just("<img src='http://x/(a) b.png' alt='&quot;'>".to_string()),
        Just("<style>".to_string()),
        Just("</style>".to_string()),
        Just("<title>".to_string()),
        Just("<textarea>".to_string()),
        Just("<xmp>".to_string()),
    ];
    prop::collection::vec(piece, 0..24).prop_map(|pieces| pieces.concat())
}

fn tag_names(html: &str) -> Vec<String> {
    html.split('<')
        .skip(1)
        .map(|rest| {
            rest.trim_start_matches('/')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect()
        })
        .collect()
}

proptest! {
    #[test]
    fn sanitizing_is_idempotent(input in fragment()) {
        let once = RICH.sanitize(&input);
        prop_assert_eq!(RICH.sanitize(&once), once);
    }

    #[test]
    fn urls_in_styles_are_idempotent(input in fragment()) {
        let once = STYLED_URLS.sanitize(&input);
        prop_assert_eq!(STYLED_URLS.sanitize(&once), once);
    }

    #[test]
    fn image_sources_are_idempotent(input in fragment()) {
        let once = IMAGES.sanitize(&input);
        prop_assert_eq!(IMAGES.sanitize(&once), once);
    }

    #[test]
    fn raw_text_elements_are_idempotent(input in fragment()) {
        let once = RAW_TEXT.sanitize(&input);
        prop_assert_eq!(RAW_TEXT.sanitize(&once), once);
    }

    #[test]
    fn unlisted_elements_never_leak(input in fragment()) {
        let out = RICH.sanitize(&input);
        for name in tag_names(&out) {
            prop_assert!(!FORBIDDEN.contains(&name.as_str()), "{name} leaked from {input:?}");
        }
        prop_assert!(!out.contains("href=\"javascript"), "script url leaked: {out}");
    }

    #[test]
    fn text_only_output_has_no_markup(input in "\\PC{0,64}") {
        let out = TEXT_ONLY.sanitize(&input);
        prop_assert!(!out.contains('<'));
        prop_assert!(!out.contains('>'));
    }
}
