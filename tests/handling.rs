use mp4chap::{
    mux, parse_mp4, ErrorKind, ImageChapter, MetadataSet, MuxRequest, TextChapter,
};

mod common;
use common::{
    adts_stream, be16, be32, be64, children, find, find_all, jpeg_image, png_image, Synth,
};

/// Re-extracts the raw audio payload of a file through the parser's table description.
fn extract_audio(buf: &[u8]) -> Vec<u8> {
    let parsed = parse_mp4(buf).unwrap();
    let mut sizes = parsed.sample_sizes.iter();
    let mut payload = Vec::new();
    for (offset, in_chunk) in parsed.chunk_offsets.iter().zip(&parsed.samples_per_chunk) {
        let mut pos = *offset as usize;
        for _ in 0..*in_chunk {
            let size = *sizes.next().unwrap() as usize;
            payload.extend_from_slice(&buf[pos..pos + size]);
            pos += size;
        }
    }
    payload
}

#[test]
fn round_trip_audio_fidelity() {
    let mut synth = Synth::new(44100, 441_000, (0..40).map(|i| 100 + i).collect());
    synth.samples_per_chunk = vec![21, 19];
    let (src, payload) = synth.build();

    assert_eq!(extract_audio(&src), payload);

    let out = mux(&src, &MuxRequest::new()).unwrap();
    let parsed = parse_mp4(&out).unwrap();
    assert_eq!(parsed.timescale, 44100);
    assert_eq!(parsed.duration, 441_000);
    assert_eq!(parsed.sample_count(), 40);
    assert!(!parsed.used_fallback_stbl);
    assert_eq!(extract_audio(&out), payload);

    // remuxing the output is stable as well
    let again = mux(&out, &MuxRequest::new()).unwrap();
    assert_eq!(extract_audio(&again), payload);
}

#[test]
fn chapter_track_layout() {
    let (src, _) = Synth::new(1000, 600_000, vec![64; 10]).build();

    // deliberately unsorted input
    let request = MuxRequest::new().with_chapters(vec![
        TextChapter::new(480_000, "Outro"),
        TextChapter::new(0, "Intro"),
        TextChapter::with_href(120_000, "Chapter 2", "https://example.com"),
    ]);
    let out = mux(&src, &request).unwrap();

    let moov = find(&out, &[b"moov"]).unwrap();
    let traks = find_all(moov, b"trak");
    assert_eq!(traks.len(), 2);

    // the audio track references the text track as its chapter track
    let chap = find(traks[0], &[b"tref", b"chap"]).unwrap();
    assert_eq!(chap.len(), 4);
    assert_eq!(be32(chap, 0), 2);

    let stbl = find(traks[1], &[b"mdia", b"minf", b"stbl"]).unwrap();
    let stsd = find(stbl, &[b"stsd"]).unwrap();
    assert_eq!(&stsd[12..16], b"tx3g");

    // exactly 3 samples with durations 120000, 360000, 120000 in the ms timescale
    let stts = find(stbl, &[b"stts"]).unwrap();
    assert_eq!(be32(stts, 4), 3);
    let durations: Vec<u32> = (0..3).map(|i| be32(stts, 8 + i * 8 + 4)).collect();
    assert_eq!(durations, vec![120_000, 360_000, 120_000]);

    // the media timescale of the chapter track is milliseconds
    let mdhd = find(traks[1], &[b"mdia", b"mdhd"]).unwrap();
    assert_eq!(be32(mdhd, 12), 1000);

    // the second sample carries the href modifier after the text run
    let stsz = find(stbl, &[b"stsz"]).unwrap();
    let sizes: Vec<u32> = (0..3).map(|i| be32(stsz, 12 + i * 4)).collect();
    let stco = find(stbl, &[b"stco"]).unwrap();
    assert_eq!(be32(stco, 4), 3);
    let second = be32(stco, 8 + 4) as usize;
    let sample = &out[second..second + sizes[1] as usize];

    let title = "Chapter 2";
    let url = "https://example.com";
    assert_eq!(be16(sample, 0) as usize, title.len());
    assert_eq!(&sample[2..2 + title.len()], title.as_bytes());
    let href = &sample[2 + title.len()..];
    assert_eq!(&href[4..8], b"href");
    assert_eq!(href[12] as usize, url.len());
    assert_eq!(&href[13..13 + url.len()], url.as_bytes());

    // the chapter list mirrors the chapter starts in 100ns units
    let chpl = find(moov, &[b"udta", b"chpl"]).unwrap();
    assert_eq!(chpl[4], 3);
    assert_eq!(be64(chpl, 5), 0);
    assert_eq!(chpl[13], 5);
    assert_eq!(&chpl[14..19], b"Intro");
    assert_eq!(be64(chpl, 19), 120_000 * 10_000);
}

#[test]
fn image_chapter_track() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let request = MuxRequest::new()
        .with_chapters(vec![TextChapter::new(0, "One"), TextChapter::new(5_000, "Two")])
        .with_images(vec![
            ImageChapter::new(0, jpeg_image(1280, 720)),
            ImageChapter::new(5_000, jpeg_image(1280, 720)),
        ]);
    let out = mux(&src, &request).unwrap();

    let moov = find(&out, &[b"moov"]).unwrap();
    let traks = find_all(moov, b"trak");
    assert_eq!(traks.len(), 3);

    // the audio track references both chapter tracks
    let chap = find(traks[0], &[b"tref", b"chap"]).unwrap();
    assert_eq!((be32(chap, 0), be32(chap, 4)), (2, 3));

    let stbl = find(traks[2], &[b"mdia", b"minf", b"stbl"]).unwrap();
    let stsd = find(stbl, &[b"stsd"]).unwrap();
    assert_eq!(&stsd[12..16], b"jpeg");
    // width and height live behind the sample entry header and quality fields
    assert_eq!(be16(stsd, 16 + 8 + 8 + 8), 1280);
    assert_eq!(be16(stsd, 16 + 8 + 8 + 8 + 2), 720);

    // every image sample is a sync sample
    let stss = find(stbl, &[b"stss"]).unwrap();
    assert_eq!(be32(stss, 4), 2);

    // the image bytes land in the media data verbatim
    let stco = find(stbl, &[b"stco"]).unwrap();
    let first = be32(stco, 8) as usize;
    let jpeg = jpeg_image(1280, 720);
    assert_eq!(&out[first..first + jpeg.len()], &jpeg[..]);

    // the image track maps the movie timeline through an edit list
    assert!(find(traks[2], &[b"edts", b"elst"]).is_some());
}

#[test]
fn png_chapter_images_are_detected() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let request = MuxRequest::new().with_images(vec![ImageChapter::new(0, png_image(640, 480))]);
    let out = mux(&src, &request).unwrap();

    let moov = find(&out, &[b"moov"]).unwrap();
    let traks = find_all(moov, b"trak");
    let stsd = find(traks[1], &[b"mdia", b"minf", b"stbl", b"stsd"]).unwrap();
    assert_eq!(&stsd[12..16], b"png ");
}

#[test]
fn zero_chapters_with_title_metadata() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let metadata = MetadataSet { title: Some("X".to_owned()), ..Default::default() };
    let out = mux(&src, &MuxRequest::new().with_metadata(metadata)).unwrap();

    let moov = find(&out, &[b"moov"]).unwrap();
    // no second track and no chapter machinery
    assert_eq!(find_all(moov, b"trak").len(), 1);
    assert!(find(moov, &[b"trak", b"tref"]).is_none());
    assert!(find(moov, &[b"udta", b"chpl"]).is_none());

    // exactly one title item with the value "X"
    let meta = find(moov, &[b"udta", b"meta"]).unwrap();
    let ilst = find(&meta[4..], &[b"ilst"]).unwrap();
    let items = children(ilst);
    assert_eq!(items.len(), 1);
    assert_eq!(&items[0].0, b"\xa9nam");
    let data = items[0].1;
    assert_eq!(&data[4..8], b"data");
    assert_eq!(be32(data, 8), 1); // UTF-8 type code
    assert_eq!(&data[16..], b"X");
}

#[test]
fn empty_metadata_yields_empty_item_list() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let out = mux(&src, &MuxRequest::new()).unwrap();
    let moov = find(&out, &[b"moov"]).unwrap();
    let meta = find(moov, &[b"udta", b"meta"]).unwrap();
    let ilst = find(&meta[4..], &[b"ilst"]).unwrap();
    assert!(ilst.is_empty());
}

#[test]
fn source_metadata_is_reused() {
    let ilst_payload = {
        let mut data_content = 1u32.to_be_bytes().to_vec(); // UTF-8 type code
        data_content.extend_from_slice(&0u32.to_be_bytes()); // locale
        data_content.extend_from_slice(b"Existing Title");
        common::atom(b"\xa9nam", &common::atom(b"data", &data_content))
    };

    let mut synth = Synth::new(1000, 10_000, vec![64; 10]);
    synth.ilst = Some(ilst_payload.clone());
    let (src, _) = synth.build();

    assert_eq!(parse_mp4(&src).unwrap().ilst, Some(ilst_payload.clone()));

    // no caller metadata: the source item list survives the remux verbatim
    let out = mux(&src, &MuxRequest::new()).unwrap();
    assert_eq!(parse_mp4(&out).unwrap().ilst, Some(ilst_payload));

    // caller metadata wins over the source item list
    let metadata = MetadataSet { title: Some("New".to_owned()), ..Default::default() };
    let out = mux(&src, &MuxRequest::new().with_metadata(metadata)).unwrap();
    let reparsed = parse_mp4(&out).unwrap().ilst.unwrap();
    let items = children(&reparsed);
    assert_eq!(&items[0].1[16..], b"New");
}

#[test]
fn fallback_flag_on_inconsistent_sample_to_chunk_map() {
    let mut synth = Synth::new(44100, 441_000, vec![100; 10]);
    synth.break_stsc = true;
    let (src, payload) = synth.build();

    let parsed = parse_mp4(&src).unwrap();
    assert!(parsed.used_fallback_stbl);
    // the sample count still matches the time to sample derived total
    let stts_total: u32 = parsed.time_to_sample.iter().map(|i| i.sample_count).sum();
    assert_eq!(parsed.sample_count() as u32, stts_total);
    // the reconstructed layout still locates the payload
    assert_eq!(extract_audio(&src), payload);
}

#[test]
fn truncated_moov_is_a_structural_error() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 4]).build();

    // truncate inside the moov box
    let truncated = &src[..60];
    let err = parse_mp4(truncated).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parsing));

    let err = mux(truncated, &MuxRequest::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parsing));
}

#[test]
fn chapter_start_past_the_audio_end_is_rejected() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let request = MuxRequest::new().with_chapters(vec![TextChapter::new(10_001, "Too late")]);
    let err = mux(&src, &request).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidInput));
}

#[test]
fn unsniffable_chapter_image_is_rejected() {
    let (src, _) = Synth::new(1000, 10_000, vec![64; 10]).build();

    let request = MuxRequest::new().with_images(vec![ImageChapter::new(0, vec![1, 2, 3, 4])]);
    let err = mux(&src, &request).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidInput));
}

#[test]
fn adts_source_gets_a_built_sample_table() {
    let src = adts_stream(45);
    let out = mux(&src, &MuxRequest::new().with_chapters(vec![TextChapter::new(0, "All")]))
        .unwrap();

    let parsed = parse_mp4(&out).unwrap();
    assert_eq!(parsed.timescale, 44100);
    assert_eq!(parsed.duration, 45 * 1024);
    assert_eq!(parsed.sample_count(), 45);

    let moov = find(&out, &[b"moov"]).unwrap();
    let stsd = find(moov, &[b"trak", b"mdia", b"minf", b"stbl", b"stsd"]).unwrap();
    assert_eq!(&stsd[12..16], b"mp4a");
    assert!(find(moov, &[b"udta", b"chpl"]).is_some());
}

#[test]
fn no_audio_track_is_reported() {
    // a moov with no trak at all
    let moov = common::atom(b"moov", &common::atom(b"mvhd", &[0; 96]));
    let mut src = common::atom(b"ftyp", b"M4A \0\0\0\0isom");
    src.extend_from_slice(&moov);

    let err = parse_mp4(&src).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoAudioTrack));
}
