use super::frames::{PngSequenceSink, frame_file_name};
use super::gif::GifSink;
use super::sink::{FrameSink, InMemorySink, SinkConfig};
use super::*;
use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Canvas, Fps, FrameIndex};

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::integer(10).unwrap(),
        audio: None,
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: false,
    }
}

#[test]
fn format_names_and_extensions() {
    assert_eq!("MP4".parse::<OutputFormat>().unwrap(), OutputFormat::Mp4);
    assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Frames);
    assert!("avi".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::Webm.extension(), "webm");
    assert_eq!(OutputFormat::Frames.to_string(), "frames");
    assert!(OutputFormat::Mp4.has_audio());
    assert!(!OutputFormat::Gif.has_audio());
    assert_eq!(
        serde_json::to_string(&OutputFormat::Gif).unwrap(),
        "\"gif\""
    );
}

#[test]
fn in_process_formats_are_always_available() {
    OutputFormat::Gif.ensure_available().unwrap();
    OutputFormat::Frames.ensure_available().unwrap();
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &solid(2, 2, [i as u8, 0, 0, 255]))
            .unwrap();
    }
    sink.end().unwrap();
    assert!(sink.ended());
    assert_eq!(sink.config().unwrap().width, 2);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn png_sequence_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let mut sink = PngSequenceSink::new(&out);
    sink.begin(cfg(4, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(4, 2, [255, 0, 0, 128]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &solid(4, 2, [0, 255, 0, 255]))
        .unwrap();
    sink.end().unwrap();

    assert_eq!(frame_file_name(FrameIndex(7)), "frame_00007.png");
    let first = image::open(out.join("frame_00000.png")).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (4, 2));
    assert_eq!(first.get_pixel(3, 1).0, [255, 0, 0, 128]);
    assert!(out.join("frame_00001.png").is_file());
    assert!(!out.join("frame_00002.png").exists());
}

#[test]
fn file_sinks_reject_out_of_order_and_resized_frames() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = PngSequenceSink::new(dir.path().join("seq"));
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &solid(2, 2, [0; 4])).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &solid(2, 2, [0; 4])).is_err());
    assert!(sink.push_frame(FrameIndex(0), &solid(2, 2, [0; 4])).is_err());
    assert!(sink.push_frame(FrameIndex(2), &solid(4, 2, [0; 4])).is_err());
}

#[test]
fn gif_sink_writes_a_looping_animation() {
    use image::AnimationDecoder;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.gif");
    let mut sink = GifSink::new(&path, [0, 0, 0, 255]);
    sink.begin(cfg(4, 4)).unwrap();
    for (i, px) in [[255, 255, 255, 255], [0, 0, 0, 255], [255, 0, 0, 255]]
        .into_iter()
        .enumerate()
    {
        sink.push_frame(FrameIndex(i as u64), &solid(4, 4, px))
            .unwrap();
    }
    sink.end().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"GIF89a"));
    let decoder = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 3);
    let (num, den) = frames[0].delay().numer_denom_ms();
    assert_eq!(num / den, 100);
    let px = frames[2].buffer().get_pixel(0, 0).0;
    assert!(px[0] > 200 && px[1] < 50 && px[2] < 50, "{px:?}");
}

#[test]
fn gif_sink_requires_begin() {
    let mut sink = GifSink::new("never.gif", [0, 0, 0, 255]);
    let frame = FrameRGBA::transparent(Canvas {
        width: 2,
        height: 2,
    });
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}
