use super::*;
use serde_json::json;

#[test]
fn fps_validation_and_conversions() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());

    let fps = Fps::integer(30).unwrap();
    assert_eq!(fps.secs_to_frames_floor(2.0), 60);
    assert_eq!(fps.secs_to_frames_floor(0.99), 29);
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-9);
}

#[test]
fn canvas_even_rounds_up() {
    assert_eq!(
        Canvas::even(11, 20),
        Canvas {
            width: 12,
            height: 20
        }
    );
    assert_eq!(Canvas::even(10, 7).height, 8);
    assert_eq!(Canvas::even(4, 2).rgba_len(), 32);
}

#[test]
fn parses_arrays_and_hex() {
    let c: Rgba8 = serde_json::from_value(json!([255, 128, 0])).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 128, 0));

    let c: Rgba8 = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Rgba8::rgba(1, 2, 3, 4));

    let c: Rgba8 = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 128));

    assert!(serde_json::from_value::<Rgba8>(json!([1, 2])).is_err());
    assert!(serde_json::from_value::<Rgba8>(json!("#12345")).is_err());
}

#[test]
fn serializes_as_array() {
    let v = serde_json::to_value(Rgba8::rgba(9, 8, 7, 6)).unwrap();
    assert_eq!(v, json!([9, 8, 7, 6]));
}

#[test]
fn parses_cli_channel_lists() {
    assert_eq!(Rgba8::parse("255,255,255").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::parse(" 121, 121, 121, 255 ").unwrap(),
        Rgba8::rgb(121, 121, 121)
    );
    assert_eq!(Rgba8::parse("#000000").unwrap(), Rgba8::BLACK);
    assert!(Rgba8::parse("300,0,0").is_err());
    assert!(Rgba8::parse("1,2").is_err());
}
