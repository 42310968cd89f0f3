//! Building the synthesized chapter tracks: timed text samples (with optional hyperlink
//! modifier) and timed image samples, together with their sample tables.

use byteorder::{BigEndian, WriteBytesExt};

use crate::atom::{ChunkOffsets, Stbl, Stsc, Stsd, Stss, Stsz, Stts, HYPERLINK};
use crate::logging::diag;
use crate::types::{ImageChapter, ImgFmt, ImgInfo, TextChapter};
use crate::{Error, ErrorKind, Logger, Verbosity};

/// Timescale of the synthesized chapter tracks: milliseconds, which avoids rounding bias
/// against the audio track's timescale.
pub(crate) const CHAPTER_TIMESCALE: u32 = 1000;

/// A synthesized chapter track: its sample table and the encoded sample payloads destined for
/// the media data area, one chunk per sample.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct BuiltTrack {
    pub stbl: Stbl,
    pub samples: Vec<Vec<u8>>,
    /// The track duration in the chapter timescale (milliseconds).
    pub duration: u64,
    /// The dimensions of the first image, zero for text tracks.
    pub dimensions: (u16, u16),
}

/// Derives per-sample durations in milliseconds from sorted start times. The duration of each
/// sample is the gap to the next start; the last sample fills the remaining time up to
/// `total_ms` (minimum 1 ms).
pub(crate) fn derive_durations_ms(starts: &[u64], total_ms: u64, logger: &dyn Logger) -> Vec<u32> {
    let mut durations = Vec::with_capacity(starts.len());
    if starts.is_empty() {
        return durations;
    }

    if starts[0] != 0 {
        diag!(
            logger,
            Verbosity::Warn,
            "first chapter starts at {}ms, Apple players expect 0ms and may not show titles",
            starts[0],
        );
    }

    for (i, start) in starts.iter().enumerate() {
        let duration = match starts.get(i + 1) {
            Some(next) if next > start => next - start,
            Some(_) => 1,
            None if *start < total_ms => total_ms - start,
            None => 1,
        };
        durations.push(duration.clamp(1, u32::MAX as u64) as u32);
    }
    durations
}

/// Encodes one timed text sample: a 16 bit length prefix and the UTF-8 title bytes. A chapter
/// hyperlink is appended as an `href` modifier box after the text run, the visible text stays
/// the plain title.
pub(crate) fn encode_text_sample(chapter: &TextChapter) -> crate::Result<Vec<u8>> {
    if chapter.title.len() > u16::MAX as usize {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Chapter title of {} bytes exceeds the 16 bit length prefix", chapter.title.len()),
        ));
    }

    let mut out = Vec::with_capacity(2 + chapter.title.len());
    out.write_u16::<BigEndian>(chapter.title.len() as u16)?;
    out.extend_from_slice(chapter.title.as_bytes());

    if let Some(href) = &chapter.href {
        let url = &href.as_bytes()[..href.len().min(255)];
        let box_len = 4 + 4 + 2 + 2 + 1 + url.len() as u32 + 1;
        out.write_u32::<BigEndian>(box_len)?;
        out.extend_from_slice(&*HYPERLINK);
        out.write_u16::<BigEndian>(0)?; // start char
        out.write_u16::<BigEndian>(0x000A)?; // end char, range observed in Apple authored files
        out.push(url.len() as u8);
        out.extend_from_slice(url);
        out.push(0); // pad
    }

    Ok(out)
}

/// Builds the text chapter track. Input order doesn't matter, chapters are sorted by start
/// time before durations are derived.
pub(crate) fn build_text_track(
    chapters: &[TextChapter],
    total_ms: u64,
    logger: &dyn Logger,
) -> crate::Result<BuiltTrack> {
    let mut chapters = chapters.to_vec();
    chapters.sort_by_key(|c| c.start_ms);

    let starts: Vec<u64> = chapters.iter().map(|c| c.start_ms).collect();
    let durations = derive_durations_ms(&starts, total_ms, logger);

    let mut samples = Vec::with_capacity(chapters.len());
    for c in chapters.iter() {
        samples.push(encode_text_sample(c)?);
    }

    let stbl = Stbl {
        stsd: Stsd::tx3g(),
        stts: Stts::per_sample(&durations),
        stss: None,
        stsc: Stsc::from_plan(&vec![1; samples.len()]),
        stsz: Stsz::variable(samples.iter().map(|s| s.len() as u32).collect()),
        offsets: ChunkOffsets::placeholder(samples.len()),
    };

    Ok(BuiltTrack {
        stbl,
        samples,
        duration: durations.iter().map(|d| *d as u64).sum(),
        dimensions: (0, 0),
    })
}

/// Builds the image chapter track. Input order doesn't matter, chapters are sorted by start
/// time before durations are derived. The sample description's format and dimensions are read
/// from the first image; every image must sniff to the same format, and JPEGs must be 4:2:0
/// subsampled for Apple players to display them.
pub(crate) fn build_image_track(
    chapters: &[ImageChapter],
    total_ms: u64,
    logger: &dyn Logger,
) -> crate::Result<BuiltTrack> {
    let mut chapters = chapters.to_vec();
    chapters.sort_by_key(|c| c.start_ms);

    let first = ImgInfo::read(&chapters[0].data)?;
    check_image(&first, 0, first.fmt)?;

    for (i, c) in chapters.iter().enumerate().skip(1) {
        let info = ImgInfo::read(&c.data)?;
        check_image(&info, i, first.fmt)?;
        if (info.width, info.height) != (first.width, first.height) {
            diag!(
                logger,
                Verbosity::Warn,
                "chapter image {} is {}x{}, differing from the first image's {}x{}; Apple \
                 players may only display the first",
                i,
                info.width,
                info.height,
                first.width,
                first.height,
            );
        }
    }

    let starts: Vec<u64> = chapters.iter().map(|c| c.start_ms).collect();
    let durations = derive_durations_ms(&starts, total_ms, logger);

    let stbl = Stbl {
        stsd: Stsd::image(first.fmt, first.width, first.height),
        stts: Stts::per_sample(&durations),
        stss: Some(Stss { sample_count: chapters.len() as u32 }),
        stsc: Stsc::from_plan(&vec![1; chapters.len()]),
        stsz: Stsz::variable(chapters.iter().map(|c| c.data.len() as u32).collect()),
        offsets: ChunkOffsets::placeholder(chapters.len()),
    };

    Ok(BuiltTrack {
        stbl,
        samples: chapters.iter().map(|c| c.data.clone()).collect(),
        duration: durations.iter().map(|d| *d as u64).sum(),
        dimensions: (first.width, first.height),
    })
}

fn check_image(info: &ImgInfo, index: usize, expected: ImgFmt) -> crate::Result<()> {
    if info.fmt != expected {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Chapter image {index} is {:?} but the first image is {expected:?}", info.fmt),
        ));
    }
    if info.width == 0 || info.height == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Chapter image {index} has no decodable dimensions"),
        ));
    }
    if info.fmt == ImgFmt::Jpeg && !info.yuv420 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Chapter image {index} is not 4:2:0 subsampled, re-encode it as yuvj420p"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::test::jpeg_header;
    use crate::NopLogger;

    #[test]
    fn durations_fill_the_audio() {
        let durations = derive_durations_ms(&[0, 120_000, 480_000], 600_000, &NopLogger);
        assert_eq!(durations, vec![120_000, 360_000, 120_000]);
    }

    #[test]
    fn single_chapter_spans_the_whole_file() {
        let durations = derive_durations_ms(&[0], 600_000, &NopLogger);
        assert_eq!(durations, vec![600_000]);
    }

    #[test]
    fn last_chapter_at_the_end_gets_minimum_duration() {
        let durations = derive_durations_ms(&[0, 600_000], 600_000, &NopLogger);
        assert_eq!(durations, vec![600_000, 1]);
    }

    #[test]
    fn duplicate_starts_get_minimum_duration() {
        let durations = derive_durations_ms(&[0, 5_000, 5_000], 10_000, &NopLogger);
        assert_eq!(durations, vec![5_000, 1, 5_000]);
    }

    #[test]
    fn text_sample_encoding() {
        let sample = encode_text_sample(&TextChapter::new(0, "Intro")).unwrap();
        assert_eq!(sample, b"\x00\x05Intro");
    }

    #[test]
    fn text_sample_with_href_modifier() {
        let chapter = TextChapter::with_href(0, "Ch", "https://example.com");
        let sample = encode_text_sample(&chapter).unwrap();

        // text run
        assert_eq!(&sample[..4], b"\x00\x02Ch");
        // href box: size + type
        let url = "https://example.com";
        let box_len = 4 + 4 + 2 + 2 + 1 + url.len() + 1;
        assert_eq!(&sample[4..8], &(box_len as u32).to_be_bytes());
        assert_eq!(&sample[8..12], b"href");
        assert_eq!(sample[16] as usize, url.len());
        assert_eq!(&sample[17..17 + url.len()], url.as_bytes());
        assert_eq!(*sample.last().unwrap(), 0);
        assert_eq!(sample.len(), 4 + box_len);
    }

    #[test]
    fn text_track_tables_are_consistent() {
        let chapters = vec![
            TextChapter::new(0, "Intro"),
            TextChapter::with_href(120_000, "Chapter 2", "https://example.com"),
            TextChapter::new(480_000, "Outro"),
        ];
        let track = build_text_track(&chapters, 600_000, &NopLogger).unwrap();

        assert_eq!(track.samples.len(), 3);
        assert_eq!(track.duration, 600_000);
        assert_eq!(track.stbl.stts.total_duration(), 600_000);
        assert_eq!(track.stbl.stts.total_samples(), 3);
        assert_eq!(track.stbl.stsz.sample_count, 3);
        assert_eq!(track.stbl.offsets.entry_count(), 3);
        for (sample, size) in track.samples.iter().zip(&track.stbl.stsz.sizes) {
            assert_eq!(sample.len() as u32, *size);
        }
    }

    #[test]
    fn image_track_rejects_mixed_formats() {
        let chapters = vec![
            ImageChapter::new(0, jpeg_header(64, 48, true)),
            ImageChapter::new(1000, crate::types::test::png_header(64, 48)),
        ];
        let err = build_image_track(&chapters, 2000, &NopLogger).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidInput));
    }

    #[test]
    fn image_track_rejects_chroma_subsampling_other_than_420() {
        let chapters = vec![ImageChapter::new(0, jpeg_header(64, 48, false))];
        let err = build_image_track(&chapters, 2000, &NopLogger).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidInput));
    }

    #[test]
    fn image_track_takes_dimensions_from_the_first_image() {
        let chapters = vec![
            ImageChapter::new(0, jpeg_header(1280, 720, true)),
            ImageChapter::new(1000, jpeg_header(640, 480, true)),
        ];
        let track = build_image_track(&chapters, 2000, &NopLogger).unwrap();
        assert_eq!(track.dimensions, (1280, 720));
        assert!(track.stbl.stss.is_some());
    }
}
