//! Codec Tests
//!
//! Tests for value and request encoding/decoding.

use std::io::Cursor;

use bytes::Bytes;
use ferrokv::protocol::{
    decode_value, encode_value, read_request, read_value, write_request, write_value,
    Request, Value, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_LINE_LEN,
};
use ferrokv::FerroError;

// =============================================================================
// Wire Format Tests
// =============================================================================

#[test]
fn test_wire_format_scalars() {
    assert_eq!(encode_value(&Value::simple("OK")), b"+OK\r\n");
    assert_eq!(encode_value(&Value::error("ERR boom")), b"-ERR boom\r\n");
    assert_eq!(encode_value(&Value::Integer(-42)), b":-42\r\n");
    assert_eq!(encode_value(&Value::bulk("hello")), b"$5\r\nhello\r\n");
    assert_eq!(encode_value(&Value::Null), b"$-1\r\n");
}

#[test]
fn test_wire_format_request_array() {
    let value = Value::array(vec!["GET".into(), "a".into()]);
    assert_eq!(encode_value(&value), b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n");
}

#[test]
fn test_wire_format_empty_array_and_empty_bulk() {
    assert_eq!(encode_value(&Value::array(vec![])), b"*0\r\n");
    assert_eq!(encode_value(&Value::bulk("")), b"$0\r\n\r\n");
}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_round_trip_every_kind() {
    let values = vec![
        Value::simple("Pong"),
        Value::error("ERR unknown command 'FOO'"),
        Value::Integer(0),
        Value::Integer(i64::MIN),
        Value::Integer(i64::MAX),
        Value::bulk(""),
        Value::bulk("with\r\ninside"),
        Value::Null,
        Value::array(vec![]),
        Value::array(vec![
            Value::Integer(1),
            Value::array(vec![Value::bulk("nested"), Value::Null]),
            Value::simple("x"),
        ]),
    ];

    for value in values {
        let decoded = decode_value(&encode_value(&value)).unwrap();
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_round_trip_binary_bulk() {
    let data: Vec<u8> = (0..=255).collect();
    let value = Value::bulk(Bytes::from(data));
    assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
}

#[test]
fn test_null_array_decodes_to_null() {
    assert_eq!(decode_value(b"*-1\r\n").unwrap(), Value::Null);
}

// =============================================================================
// Stream Tests
// =============================================================================

#[test]
fn test_stream_multiple_values_then_end() {
    let values = vec![
        Value::ok(),
        Value::bulk("data"),
        Value::Null,
        Value::error("ERR oops"),
    ];

    let mut buffer = Vec::new();
    for value in &values {
        write_value(&mut buffer, value).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &values {
        assert_eq!(read_value(&mut cursor).unwrap().as_ref(), Some(expected));
    }
    assert!(read_value(&mut cursor).unwrap().is_none());
}

#[test]
fn test_empty_stream_is_clean_end() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    assert!(read_value(&mut cursor).unwrap().is_none());
    assert!(read_request(&mut cursor).unwrap().is_none());
}

#[test]
fn test_stream_requests() {
    let requests = vec![
        Request::from_parts(["PING"]).unwrap(),
        Request::from_parts(["SET", "k1", "v1"]).unwrap(),
        Request::from_parts(["hgetall", "h"]).unwrap(),
    ];

    let mut buffer = Vec::new();
    for request in &requests {
        write_request(&mut buffer, request).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &requests {
        assert_eq!(read_request(&mut cursor).unwrap().as_ref(), Some(expected));
    }
    assert!(read_request(&mut cursor).unwrap().is_none());
}

#[test]
fn test_request_keeps_name_as_sent() {
    let request = decode_value(b"*2\r\n$3\r\nget\r\n$3\r\nkey\r\n")
        .and_then(Request::from_value)
        .unwrap();
    assert_eq!(request.name(), "get");
    assert_eq!(request.args(), &[Bytes::from_static(b"key")]);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_bad_type_prefix() {
    assert!(matches!(decode_value(b"?what\r\n"), Err(FerroError::Protocol(_))));
}

#[test]
fn test_bulk_length_mismatch() {
    // Declares 3 bytes but carries 5 before the CRLF
    assert!(matches!(
        decode_value(b"$3\r\nhello\r\n"),
        Err(FerroError::Protocol(_))
    ));
}

#[test]
fn test_negative_bulk_length() {
    assert!(matches!(decode_value(b"$-5\r\n"), Err(FerroError::Protocol(_))));
}

#[test]
fn test_non_numeric_length() {
    assert!(matches!(decode_value(b"*x\r\n"), Err(FerroError::Protocol(_))));
}

#[test]
fn test_premature_end_inside_bulk() {
    assert!(matches!(
        decode_value(b"$5\r\nhel"),
        Err(FerroError::UnexpectedEof)
    ));
}

#[test]
fn test_premature_end_inside_array() {
    assert!(matches!(
        decode_value(b"*2\r\n$3\r\nGET\r\n"),
        Err(FerroError::UnexpectedEof)
    ));
}

#[test]
fn test_premature_end_inside_header() {
    assert!(matches!(decode_value(b"*2"), Err(FerroError::UnexpectedEof)));
}

#[test]
fn test_empty_slice_is_unexpected_eof() {
    assert!(matches!(decode_value(b""), Err(FerroError::UnexpectedEof)));
}

#[test]
fn test_request_must_be_array_of_bulk_strings() {
    assert!(Request::from_value(Value::bulk("PING")).is_err());
    assert!(Request::from_value(Value::array(vec![])).is_err());
    assert!(Request::from_value(Value::array(vec![Value::Integer(1)])).is_err());
    assert!(Request::from_value(Value::array(vec!["SET".into(), Value::Null])).is_err());
}

#[test]
fn test_request_name_must_be_utf8() {
    let value = Value::array(vec![Value::bulk(Bytes::from_static(&[0xff, 0xfe]))]);
    assert!(matches!(Request::from_value(value), Err(FerroError::Protocol(_))));
}

#[test]
fn test_read_request_rejects_malformed_streams() {
    for input in [
        &b"*0\r\n"[..],
        &b"$4\r\nPING\r\n"[..],
        &b"*2\r\n$3\r\nGET\r\n:1\r\n"[..],
        &b"*2\r\n$3\r\nGET\r\n*1\r\n$1\r\na\r\n"[..],
        &b"*1\r\n$-1\r\n"[..],
    ] {
        let mut cursor = Cursor::new(input);
        assert!(
            matches!(read_request(&mut cursor), Err(FerroError::Protocol(_))),
            "accepted {:?}",
            input.escape_ascii().to_string()
        );
    }
}

#[test]
fn test_read_request_stops_at_nested_array_header() {
    // Deeply nested input is refused at the first inner header
    let mut input = b"*1\r\n".repeat(100_000);
    input.extend_from_slice(b"$1\r\na\r\n");
    let mut cursor = Cursor::new(&input[..]);

    assert!(matches!(read_request(&mut cursor), Err(FerroError::Protocol(_))));
    assert_eq!(cursor.position(), 8);
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_long_simple_string_and_error_round_trip() {
    for value in [
        Value::simple("a".repeat(70_000)),
        Value::error(format!("ERR {}", "e".repeat(MAX_LINE_LEN))),
    ] {
        assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
    }
}

#[test]
fn test_deeply_nested_array_round_trips() {
    let mut value = Value::bulk("leaf");
    for _ in 0..40 {
        value = Value::array(vec![value, Value::Integer(0)]);
    }
    assert_eq!(decode_value(&encode_value(&value)).unwrap(), value);
}

#[test]
fn test_array_length_limit() {
    let at_limit = format!("*{}\r\n", MAX_ARRAY_LEN);
    assert!(matches!(
        decode_value(at_limit.as_bytes()),
        Err(FerroError::UnexpectedEof)
    ));

    let past_limit = format!("*{}\r\n", MAX_ARRAY_LEN + 1);
    assert!(matches!(
        decode_value(past_limit.as_bytes()),
        Err(FerroError::Protocol(_))
    ));
}

#[test]
fn test_bulk_length_limit() {
    let at_limit = format!("${}\r\n", MAX_BULK_LEN);
    assert!(matches!(
        decode_value(at_limit.as_bytes()),
        Err(FerroError::UnexpectedEof)
    ));

    let past_limit = format!("${}\r\n", MAX_BULK_LEN + 1);
    assert!(matches!(
        decode_value(past_limit.as_bytes()),
        Err(FerroError::Protocol(_))
    ));
}
