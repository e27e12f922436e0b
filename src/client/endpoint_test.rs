use super::endpoint::*;
use crate::error::Error;

#[test]
fn test_resolve_room_id() {
    let tests = vec![
        ("192.168.1.5", "192.168.1.5", DEFAULT_PORT),
        ("192.168.1.5:9000", "192.168.1.5", 9000),
        ("10.0.0.1:1", "10.0.0.1", 1),
        // the pattern checks shape, not octet range
        ("999.1.1.1", "999.1.1.1", DEFAULT_PORT),
        ("localhost", "localhost", DEFAULT_PORT),
        ("localhost:9000", "localhost", 9000),
        ("::", "::", DEFAULT_PORT),
        ("::1", "::1", DEFAULT_PORT),
        ("[::1]", "::1", DEFAULT_PORT),
        ("[::1]:9000", "::1", 9000),
        ("[2001:db8::1]:4443", "2001:db8::1", 4443),
        ("fe80:0:0:0:0:0:0:1", "fe80:0:0:0:0:0:0:1", DEFAULT_PORT),
        ("[fe80:0:0:0:0:0:0:1]:9000", "fe80:0:0:0:0:0:0:1", 9000),
        // without brackets the trailing group folds into the address
        ("::1:9000", "::1:9000", DEFAULT_PORT),
    ];

    for (room_id, expected_host, expected_port) in tests {
        let result = RoomEndpoint::resolve(room_id);
        assert!(result.is_ok(), "testCase: {room_id}: resolve err: {result:?}");
        let endpoint = result.unwrap();
        assert_eq!(endpoint.host, expected_host, "testCase: {room_id}");
        assert_eq!(endpoint.port, expected_port, "testCase: {room_id}");
    }
}

#[test]
fn test_resolve_room_id_failure() {
    let tests = vec![
        "",
        "not-an-ip",
        "example.com",
        "192.168.1",
        "192.168.1.5:",
        "192.168.1.5:port",
        " 192.168.1.5",
        "192.168.1.5 ",
        "[::1]extra",
        "zz::1",
    ];

    for room_id in tests {
        let result = RoomEndpoint::resolve(room_id);
        assert_eq!(
            result,
            Err(Error::InvalidEndpoint(room_id.to_owned())),
            "testCase: {room_id}"
        );
    }
}

#[test]
fn test_resolve_room_id_port_failure() {
    let tests = vec![("192.168.1.5:99999", "99999"), ("localhost:70000", "70000")];

    for (room_id, port_str) in tests {
        let result = RoomEndpoint::resolve(room_id);
        assert_eq!(
            result,
            Err(Error::InvalidPort(port_str.to_owned())),
            "testCase: {room_id}"
        );
    }
}

#[test]
fn test_room_endpoint_display() {
    let tests = vec![
        ("192.168.1.5:9000", "192.168.1.5:9000"),
        ("localhost", "localhost:8888"),
        ("[::1]:9000", "[::1]:9000"),
        ("::1", "[::1]:8888"),
    ];

    for (room_id, expected) in tests {
        let endpoint = RoomEndpoint::resolve(room_id).unwrap();
        assert_eq!(endpoint.to_string(), expected, "testCase: {room_id}");
    }
}
