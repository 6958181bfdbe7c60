// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::parse_size_expression;

#[test]
fn integer_arithmetic_is_evaluated() {
    assert_eq!(parse_size_expression("1024").expect("size"), 1024);
    assert_eq!(parse_size_expression("2 * 1024 + 512").expect("size"), 2560);
    assert_eq!(parse_size_expression("2 * (1024 + 512)").expect("size"), 3072);
}

#[test]
fn negative_overflowing_and_textual_sizes_are_rejected() {
    for bad in [
        "-1",
        "some_string",
        "all",
        "18446744073709551615 + 1",
        "4294967296 * 4294967296",
        "2 +",
        "",
    ] {
        assert!(parse_size_expression(bad).is_err(), "expected error for {bad:?}");
    }
}
