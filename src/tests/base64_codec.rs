use super::*;
use crate::base64::{
    decode_base64_to_binary_string, decode_to_bytes, encode_binary_string, encode_bytes,
};

#[test]
fn empty_input_round_trips_to_empty() {
    assert_eq!(decode_base64_to_binary_string("").as_deref(), Some(""));
    assert_eq!(encode_binary_string("").as_deref(), Some(""));
}

#[test]
fn decodes_padded_and_unpadded_groups() {
    assert_eq!(decode_base64_to_binary_string("Zg==").as_deref(), Some("f"));
    assert_eq!(decode_base64_to_binary_string("Zm8=").as_deref(), Some("fo"));
    assert_eq!(decode_base64_to_binary_string("Zm9v").as_deref(), Some("foo"));
    assert_eq!(decode_base64_to_binary_string("Zg").as_deref(), Some("f"));
    assert_eq!(decode_base64_to_binary_string("Zm8").as_deref(), Some("fo"));
}

#[test]
fn encodes_with_padding() {
    assert_eq!(encode_binary_string("f").as_deref(), Some("Zg=="));
    assert_eq!(encode_binary_string("fo").as_deref(), Some("Zm8="));
    assert_eq!(encode_binary_string("foo").as_deref(), Some("Zm9v"));
    assert_eq!(encode_binary_string("foobar").as_deref(), Some("Zm9vYmFy"));
}

#[test]
fn malformed_input_yields_none() {
    assert_eq!(decode_base64_to_binary_string("A"), None);
    assert_eq!(decode_base64_to_binary_string("f#=="), None);
    assert_eq!(decode_base64_to_binary_string("Zm9vY"), None);
    // Padding is only stripped from a length that is a multiple of four.
    assert_eq!(decode_base64_to_binary_string("Zg="), None);
    assert_eq!(decode_base64_to_binary_string("Zg==="), None);
    assert_eq!(decode_base64_to_binary_string("Z=g="), None);
    assert_eq!(decode_base64_to_binary_string("Zm9v\u{e9}"), None);
}

#[test]
fn whitespace_is_ignored_before_length_checks() {
    assert_eq!(
        decode_base64_to_binary_string(" Zm\t9v\nYm\x0cFy\r ").as_deref(),
        Some("foobar")
    );
    assert_eq!(decode_base64_to_binary_string("Zg =\n=").as_deref(), Some("f"));
}

#[test]
fn leftover_bits_are_discarded() {
    // "Zh" carries 12 bits; only the top 8 become the byte.
    assert_eq!(decode_to_bytes("Zh"), Some(vec![0x66]));
    assert_eq!(decode_to_bytes("Zm9"), Some(vec![0x66, 0x6f]));
}

#[test]
fn binary_strings_keep_high_byte_values() {
    let src: String = (0u8..=255).map(char::from).collect();
    let encoded = encode_binary_string(&src).expect("latin-1 input encodes");
    assert_eq!(decode_base64_to_binary_string(&encoded), Some(src));
}

#[test]
fn code_points_above_latin1_are_rejected() {
    assert_eq!(encode_binary_string("\u{100}"), None);
    assert_eq!(encode_binary_string("ok\u{2603}"), None);
}

#[test]
fn byte_helpers_cover_the_full_alphabet() {
    let bytes = [0xfb, 0xff, 0xbf, 0x00, 0x10, 0x83];
    let encoded = encode_bytes(&bytes);
    assert_eq!(encoded, "+/+/ABCD");
    assert_eq!(decode_to_bytes(&encoded), Some(bytes.to_vec()));
}

#[test]
fn window_atob_and_btoa_follow_the_codec() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    assert_eq!(window.btoa("foo").as_deref(), Some("Zm9v"));
    assert_eq!(window.atob("Zm9v").as_deref(), Some("foo"));
    assert_eq!(window.call("atob", &[Value::from("A")])?, Some(Value::Null));
    assert_eq!(
        window.call("btoa", &[Value::Number(12)])?,
        Some(Value::from("MTI="))
    );
    Ok(())
}

#[test]
fn window_atob_without_arguments_is_a_type_error() -> Result<()> {
    let registry = OriginRegistry::new();
    let (window, _) = window_with_scheduler(&registry, DEFAULT_ORIGIN)?;
    match window.call("atob", &[]) {
        Err(Error::TypeError(message)) => assert_eq!(
            message,
            "Failed to execute 'atob' on 'Window': 1 argument required, but only 0 present."
        ),
        other => panic!("expected arity fault, got: {other:?}"),
    }
    Ok(())
}
