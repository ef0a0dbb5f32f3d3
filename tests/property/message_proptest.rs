//! Property-based tests for the message codec
//!
//! Uses proptest to generate random inputs and verify properties

use proptest::prelude::*;
use scrutinize::shared::message::{decode_frame, encode_frame, Header, Message, MessageReader};

fn field_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,12}"
}

fn field_value() -> impl Strategy<Value = String> {
    // No surrounding whitespace and no line breaks: values survive unchanged.
    "[!-~]([ -~]{0,30}[!-~])?"
}

fn body() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof!["[ -~]{0,20}", Just(".".to_string()), Just("..".to_string()), Just(String::new())],
        0..6,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn message() -> impl Strategy<Value = Message> {
    (prop::collection::vec((field_name(), field_value()), 0..5), body()).prop_map(
        |(fields, body)| {
            let mut header = Header::new();
            for (name, value) in fields {
                header.add(&name, value).unwrap();
            }
            Message::new(header, body)
        },
    )
}

proptest! {
    #[test]
    fn test_frame_decodes_to_same_messages(messages in prop::collection::vec(message(), 0..5)) {
        let frame = encode_frame(&messages);
        let decoded = decode_frame(&frame).unwrap();
        prop_assert_eq!(decoded, messages);
    }

    #[test]
    fn test_appending_preserves_prefix(
        existing in prop::collection::vec(message(), 0..4),
        extra in message(),
    ) {
        let mut frame = encode_frame(&existing);
        frame.extend_from_slice(&extra.encode());

        let decoded: Vec<Message> = MessageReader::new(frame.as_slice())
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(&decoded[..existing.len()], &existing[..]);
        prop_assert_eq!(decoded.last(), Some(&extra));
    }

    #[test]
    fn test_encoding_ends_with_terminator(message in message()) {
        let encoded = message.encode();
        prop_assert!(encoded.ends_with(b".\r\n"));
        prop_assert!(encoded.windows(2).all(|w| w[1] != b'\n' || w[0] == b'\r'));
    }
}
