//! Composing the output file: the original audio payload, the synthesized chapter tracks, the
//! rebuilt `moov` hierarchy with corrected chunk offsets, and the metadata payload.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::adts::{self, SAMPLES_PER_FRAME};
use crate::atom::{
    Chpl, ChplItem, ChunkOffsets, Dinf, Edts, Ftyp, Hdlr, Ilst, Mdat, Mdhd, Mdia, MediaHeader,
    Meta, Minf, Moov, Mp4aEntry, Mvhd, Nmhd, Smhd, Stbl, Stsc, Stsd, Stsz, Stts, Tkhd, Trak, Tref,
    Udta, Vmhd, WriteAtom, CHPL_TIMESCALE, LANG_ENGLISH, LANG_UNDETERMINED,
};
use crate::chapter::{self, BuiltTrack, CHAPTER_TIMESCALE};
use crate::logging::diag;
use crate::parse::parse_mp4_with;
use crate::types::{ImageChapter, MetadataSet, TextChapter};
use crate::{Error, ErrorKind, Logger, NopLogger, Verbosity};

/// Timescale of the movie header.
const MOVIE_TIMESCALE: u32 = 600;
/// Frames per chunk when the audio sample table is built from scratch for an ADTS source.
const ADTS_FRAMES_PER_CHUNK: usize = 21;

const AUDIO_TRACK_ID: u32 = 1;

/// Everything a muxing operation takes besides the audio source: chapter titles, chapter
/// images, and metadata tags. All convenience entry points funnel into this one structure.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MuxRequest {
    /// Chapter titles, in any order. An empty list adds no text track.
    pub chapters: Vec<TextChapter>,
    /// Chapter images, in any order. An empty list adds no image track.
    pub images: Vec<ImageChapter>,
    /// Metadata tags. When entirely empty, the source file's item list is reused if present.
    pub metadata: MetadataSet,
}

impl MuxRequest {
    /// Creates an empty request: no chapters, no images, no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chapter titles.
    pub fn with_chapters(mut self, chapters: Vec<TextChapter>) -> Self {
        self.chapters = chapters;
        self
    }

    /// Sets the chapter images.
    pub fn with_images(mut self, images: Vec<ImageChapter>) -> Self {
        self.images = images;
        self
    }

    /// Sets the metadata tags.
    pub fn with_metadata(mut self, metadata: MetadataSet) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Muxes the audio source and the request into a new M4A byte stream. See [`mux_with`].
pub fn mux(src: &[u8], request: &MuxRequest) -> crate::Result<Vec<u8>> {
    mux_with(src, request, &NopLogger)
}

/// Muxes the audio file at `src` and the request into a new M4A file at `dest`.
pub fn mux_file(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    request: &MuxRequest,
) -> crate::Result<()> {
    mux_file_with(src, dest, request, &NopLogger)
}

/// Muxes the audio file at `src` and the request into a new M4A file at `dest`, reporting
/// diagnostics to the logger.
///
/// The output is written to a temporary sibling of `dest` and renamed into place on success,
/// so no partial file is ever left at the destination.
pub fn mux_file_with(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    request: &MuxRequest,
    logger: &dyn Logger,
) -> crate::Result<()> {
    let buf = fs::read(src)?;
    let out = mux_with(&buf, request, logger)?;

    let dest = dest.as_ref();
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&out)?;
    tmp.persist(dest).map_err(|e| crate::Error::from(e.error))?;

    Ok(())
}

/// Muxes the audio source and the request into a new M4A byte stream, reporting diagnostics to
/// the logger.
///
/// The source is either an MP4/M4A container (its audio payload is carried over byte-exact and
/// its sample tables are reused) or a raw ADTS AAC stream (an audio sample table is built from
/// scratch). The output uses the progressive layout: `ftyp`, `moov`, `mdat`.
pub fn mux_with(src: &[u8], request: &MuxRequest, logger: &dyn Logger) -> crate::Result<Vec<u8>> {
    let audio = ingest_audio(src, logger)?;

    for c in request.chapters.iter() {
        check_chapter_start(c.start_ms, audio.duration_ms)?;
    }
    for c in request.images.iter() {
        check_chapter_start(c.start_ms, audio.duration_ms)?;
    }

    let mut text_chapters = request.chapters.clone();
    text_chapters.sort_by_key(|c| c.start_ms);
    let mut image_chapters = request.images.clone();
    image_chapters.sort_by_key(|c| c.start_ms);

    let text = match text_chapters.is_empty() {
        true => None,
        false => Some(chapter::build_text_track(&text_chapters, audio.duration_ms, logger)?),
    };
    let image = match image_chapters.is_empty() {
        true => None,
        false => Some(chapter::build_image_track(&image_chapters, audio.duration_ms, logger)?),
    };

    diag!(
        logger,
        Verbosity::Info,
        "muxing {} audio chunks, {} chapter titles, {} chapter images",
        audio.chunk_lens.len(),
        text_chapters.len(),
        image_chapters.len(),
    );

    // Track ids are assigned in trak order: audio first, then the chapter tracks.
    let mut next_track_id = AUDIO_TRACK_ID + 1;
    let mut track_id = || {
        let id = next_track_id;
        next_track_id += 1;
        id
    };
    let text_track_id = text.as_ref().map(|_| track_id());
    let image_track_id = image.as_ref().map(|_| track_id());

    let audio_movie_duration = scaled(audio.duration, audio.timescale);
    let text_movie_duration = text.as_ref().map_or(0, |t| scaled(t.duration, CHAPTER_TIMESCALE));
    let image_movie_duration = image.as_ref().map_or(0, |t| scaled(t.duration, CHAPTER_TIMESCALE));
    let movie_duration = audio_movie_duration.max(text_movie_duration).max(image_movie_duration);

    let chapter_ids: Vec<u32> = text_track_id.iter().chain(image_track_id.iter()).copied().collect();

    let mut traks = Vec::new();
    let mut track_chunk_lens: Vec<Vec<u64>> = Vec::new();
    let mut pieces: Vec<Cow<'_, [u8]>> = audio.pieces;

    traks.push(Trak {
        tkhd: Tkhd::audio(AUDIO_TRACK_ID, audio_movie_duration),
        tref: match chapter_ids.is_empty() {
            true => None,
            false => Some(Tref { chapter_ids }),
        },
        edts: None,
        mdia: Mdia {
            mdhd: Mdhd::new(audio.timescale, audio.duration, LANG_UNDETERMINED),
            hdlr: Hdlr::sound(),
            minf: Minf {
                header: MediaHeader::Sound(Smhd),
                dinf: Dinf,
                stbl: audio.stbl,
            },
        },
    });
    track_chunk_lens.push(audio.chunk_lens);

    if let (Some(track), Some(id)) = (text, text_track_id) {
        let BuiltTrack { stbl, samples, duration, .. } = track;
        traks.push(Trak {
            tkhd: Tkhd::text(id, scaled(duration, CHAPTER_TIMESCALE)),
            tref: None,
            edts: None,
            mdia: Mdia {
                mdhd: Mdhd::new(CHAPTER_TIMESCALE, duration, LANG_ENGLISH),
                hdlr: Hdlr::text("Chapter Titles"),
                minf: Minf { header: MediaHeader::Null(Nmhd), dinf: Dinf, stbl },
            },
        });
        track_chunk_lens.push(samples.iter().map(|s| s.len() as u64).collect());
        pieces.extend(samples.into_iter().map(Cow::Owned));
    }

    if let (Some(track), Some(id)) = (image, image_track_id) {
        let BuiltTrack { stbl, samples, duration, dimensions } = track;
        traks.push(Trak {
            tkhd: Tkhd::image(id, image_movie_duration, dimensions.0, dimensions.1),
            tref: None,
            edts: Some(Edts { segment_duration: image_movie_duration as u32 }),
            mdia: Mdia {
                mdhd: Mdhd::new(CHAPTER_TIMESCALE, duration, LANG_ENGLISH),
                hdlr: Hdlr::video("Chapter Images"),
                minf: Minf { header: MediaHeader::Video(Vmhd), dinf: Dinf, stbl },
            },
        });
        track_chunk_lens.push(samples.iter().map(|s| s.len() as u64).collect());
        pieces.extend(samples.into_iter().map(Cow::Owned));
    }

    let ilst = match (request.metadata.is_empty(), &audio.ilst) {
        (true, Some(payload)) if !payload.is_empty() => {
            diag!(
                logger,
                Verbosity::Info,
                "reusing {} bytes of source metadata",
                payload.len(),
            );
            Ilst::raw(payload.clone())
        }
        _ => Ilst::from_metadata(&request.metadata)?,
    };
    let chpl = match text_chapters.is_empty() {
        true => None,
        false => Some(Chpl {
            items: text_chapters
                .iter()
                .map(|c| ChplItem {
                    start: c.start_ms * (CHPL_TIMESCALE / 1000),
                    title: c.title.clone(),
                })
                .collect(),
        }),
    };

    let mut moov = Moov {
        mvhd: Mvhd {
            timescale: MOVIE_TIMESCALE,
            duration: movie_duration,
            next_track_id,
        },
        traks,
        udta: Udta { chpl, meta: Meta { ilst } },
    };

    let mdat = Mdat { pieces };
    serialize(&mut moov, mdat, &track_chunk_lens, logger)
}

/// Lays out the output stream and writes it.
///
/// Chunk offsets are computed in a fixed pass order (`ftyp`, `moov`, `mdat`) once every
/// preceding atom's size is known. If any offset exceeds the 32 bit range, every chunk offset
/// table switches to the 64 bit encoding and the layout is computed once more; widths are never
/// mixed within one file.
fn serialize(
    moov: &mut Moov,
    mdat: Mdat<'_>,
    track_chunk_lens: &[Vec<u64>],
    logger: &dyn Logger,
) -> crate::Result<Vec<u8>> {
    let ftyp = Ftyp;
    let mdat_size = mdat.size();

    let layout = |moov_len: u64| {
        let payload_start = ftyp.len() + moov_len + mdat_size.head_len();
        let mut offsets = Vec::with_capacity(track_chunk_lens.len());
        let mut cursor = payload_start;
        let mut max = 0u64;
        for lens in track_chunk_lens {
            let mut track_offsets = Vec::with_capacity(lens.len());
            for len in lens {
                track_offsets.push(cursor);
                max = max.max(cursor);
                cursor += len;
            }
            offsets.push(track_offsets);
        }
        (offsets, max)
    };

    let (offsets, max) = layout(moov.len());
    let offsets = if max > u32::MAX as u64 {
        diag!(
            logger,
            Verbosity::Info,
            "chunk offset {max} exceeds 32 bits, widening every offset table to co64",
        );
        for trak in moov.traks.iter_mut() {
            trak.mdia.minf.stbl.offsets.widen();
        }
        // Widening grew moov, offsets only move further out and stay 64 bit.
        layout(moov.len()).0
    } else {
        offsets
    };

    if offsets.len() != moov.traks.len() {
        return Err(Error::new(
            ErrorKind::Internal,
            format!("Computed offsets for {} tracks but moov has {}", offsets.len(), moov.traks.len()),
        ));
    }
    for (trak, track_offsets) in moov.traks.iter_mut().zip(&offsets) {
        trak.mdia.minf.stbl.offsets.assign(track_offsets)?;
    }

    let expected_len = ftyp.len() + moov.len() + mdat.len();
    let mut out = Vec::with_capacity(expected_len as usize);
    ftyp.write(&mut out)?;
    moov.write(&mut out)?;
    mdat.write(&mut out)?;

    if out.len() as u64 != expected_len {
        return Err(Error::new(
            ErrorKind::Internal,
            format!("Wrote {} bytes but the layout predicted {expected_len}", out.len()),
        ));
    }

    Ok(out)
}

/// The audio source normalized for muxing: media data pieces, chunk byte lengths, the sample
/// table, and timing.
struct IngestedAudio<'a> {
    pieces: Vec<Cow<'a, [u8]>>,
    chunk_lens: Vec<u64>,
    stbl: Stbl,
    timescale: u32,
    duration: u64,
    duration_ms: u64,
    ilst: Option<Vec<u8>>,
}

/// Dispatches on the source format: an MP4 container is parsed and its tables reused, anything
/// else is treated as a raw ADTS stream.
fn ingest_audio<'a>(src: &'a [u8], logger: &dyn Logger) -> crate::Result<IngestedAudio<'a>> {
    let top_level_box = matches!(
        src.get(4..8),
        Some(b"ftyp") | Some(b"moov") | Some(b"mdat") | Some(b"free") | Some(b"wide"),
    );
    if top_level_box {
        ingest_mp4(src, logger)
    } else {
        ingest_adts(src, logger)
    }
}

fn ingest_mp4<'a>(src: &'a [u8], logger: &dyn Logger) -> crate::Result<IngestedAudio<'a>> {
    let parsed = parse_mp4_with(src, logger)?;
    if parsed.sample_count() == 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "Audio track contains no samples"));
    }

    let chunks = parsed.audio_chunks(src)?;
    let chunk_lens = parsed.chunk_byte_lens();

    let stbl = Stbl {
        stsd: Stsd::raw(parsed.stsd.clone()),
        stts: Stts { items: parsed.time_to_sample.clone() },
        stss: None,
        stsc: Stsc::from_plan(&parsed.samples_per_chunk),
        stsz: match parsed.uniform_sample_size {
            Some(size) => Stsz {
                uniform_sample_size: size,
                sample_count: parsed.sample_count() as u32,
                sizes: Vec::new(),
            },
            None => Stsz::variable(parsed.sample_sizes.clone()),
        },
        offsets: ChunkOffsets::placeholder(chunks.len()),
    };

    Ok(IngestedAudio {
        pieces: chunks.into_iter().map(Cow::Borrowed).collect(),
        chunk_lens,
        stbl,
        timescale: parsed.timescale,
        duration: parsed.duration,
        duration_ms: parsed.duration_ms(),
        ilst: parsed.ilst,
    })
}

fn ingest_adts<'a>(src: &'a [u8], logger: &dyn Logger) -> crate::Result<IngestedAudio<'a>> {
    let audio = adts::extract_frames(src, logger)?;
    let frame_count = audio.frames.len();

    let mut plan = Vec::with_capacity(frame_count / ADTS_FRAMES_PER_CHUNK + 1);
    let mut remaining = frame_count;
    while remaining > 0 {
        let in_chunk = remaining.min(ADTS_FRAMES_PER_CHUNK);
        plan.push(in_chunk as u32);
        remaining -= in_chunk;
    }

    let mut chunk_lens = Vec::with_capacity(plan.len());
    let mut frame = 0;
    for in_chunk in plan.iter() {
        let len: u64 = audio.frames[frame..frame + *in_chunk as usize]
            .iter()
            .map(|f| f.len() as u64)
            .sum();
        chunk_lens.push(len);
        frame += *in_chunk as usize;
    }

    let duration = frame_count as u64 * SAMPLES_PER_FRAME as u64;
    let timescale = audio.config.sample_rate;
    let duration_ms = (duration * 1000 + timescale as u64 - 1) / timescale as u64;

    let stbl = Stbl {
        stsd: Stsd::mp4a(Mp4aEntry::new(audio.config)),
        stts: Stts::single_run(frame_count as u32, SAMPLES_PER_FRAME),
        stss: None,
        stsc: Stsc::from_plan(&plan),
        stsz: Stsz::variable(audio.frames.iter().map(|f| f.len() as u32).collect()),
        offsets: ChunkOffsets::placeholder(plan.len()),
    };

    Ok(IngestedAudio {
        pieces: audio.frames.into_iter().map(Cow::Borrowed).collect(),
        chunk_lens,
        stbl,
        timescale,
        duration,
        duration_ms,
        ilst: None,
    })
}

/// Scales a duration from a track timescale to the movie timescale.
fn scaled(duration: u64, timescale: u32) -> u64 {
    duration * MOVIE_TIMESCALE as u64 / timescale as u64
}

fn check_chapter_start(start_ms: u64, duration_ms: u64) -> crate::Result<()> {
    if start_ms > duration_ms {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Chapter start {start_ms}ms exceeds the audio duration of {duration_ms}ms"),
        ));
    }
    Ok(())
}
