use droplet_core::error::DropletError;
use droplet_core::geometry::Point;
use droplet_core::io::{parse_contour, read_contour, write_contour};

#[test]
fn test_parse_mixed_separators_and_comments() {
    let text = "# drop outline\n\n10 20\n11.5,21.25\n  12\t22  # trailing note\n";
    let points = parse_contour(text).unwrap();
    assert_eq!(
        points,
        vec![
            Point::new(10.0, 20.0),
            Point::new(11.5, 21.25),
            Point::new(12.0, 22.0),
        ]
    );
}

#[test]
fn test_parse_reports_line_number() {
    let err = parse_contour("1 2\n3 4\n5 abc\n").unwrap_err();
    match err {
        DropletError::ContourParse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_rejects_wrong_field_count() {
    assert!(matches!(
        parse_contour("1 2 3\n"),
        Err(DropletError::ContourParse { line: 1, .. })
    ));
    assert!(matches!(
        parse_contour("# header\n7\n"),
        Err(DropletError::ContourParse { line: 2, .. })
    ));
}

#[test]
fn test_parse_rejects_non_finite() {
    assert!(parse_contour("inf 2\n").is_err());
    assert!(parse_contour("NaN 2\n").is_err());
}

#[test]
fn test_empty_text_has_no_points() {
    assert!(parse_contour("# nothing here\n\n").unwrap().is_empty());
}

#[test]
fn test_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outline.txt");
    let points = vec![
        Point::new(0.5, -1.25),
        Point::new(100.0, 42.0),
        Point::new(-3.0, 7.125),
    ];
    write_contour(&path, &points).unwrap();
    assert_eq!(read_contour(&path).unwrap(), points);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_contour(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, DropletError::Io(_)));
}
