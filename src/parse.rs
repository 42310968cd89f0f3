//! Locating the audio track of an MP4 container and decoding its sample tables into a
//! normalized, validated description of every sample's byte location and duration.

use std::fs;
use std::path::Path;

use crate::atom::{
    AtomIter, Co64, Fourcc, Hdlr, Mdhd, Stco, Stsc, Stsz, Stts, SttsItem, parse_full_head,
    read_be_u32, AUDIO_HANDLER, HANDLER_REFERENCE, ITEM_LIST, MEDIA, MEDIA_HEADER,
    MEDIA_INFORMATION, METADATA, MOVIE, SAMPLE_TABLE, SAMPLE_TABLE_CHUNK_OFFSET,
    SAMPLE_TABLE_CHUNK_OFFSET_64, SAMPLE_TABLE_SAMPLE_DESCRIPTION,
    SAMPLE_TABLE_SAMPLE_SIZE, SAMPLE_TABLE_SAMPLE_TO_CHUNK, SAMPLE_TABLE_TIME_TO_SAMPLE, TRACK,
    USER_DATA,
};
use crate::logging::diag;
use crate::{Error, ErrorKind, Logger, NopLogger, Verbosity};

/// The audio track of a parsed MP4 container, normalized from its sample table boxes.
///
/// Invariants upheld by the parser: the sample size table covers exactly the sample count
/// implied by the time to sample table, and the chunk offset table covers exactly the chunk
/// count implied by the samples per chunk plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedMp4 {
    /// The audio track's timescale in units per second.
    pub timescale: u32,
    /// The audio duration in timescale units.
    pub duration: u64,
    /// The verbatim sample description (`stsd`) payload, preserved so opaque decoder
    /// configuration survives remuxing byte-exact.
    pub stsd: Vec<u8>,
    /// The source's uniform sample size, when it used the compact `stsz` encoding.
    pub uniform_sample_size: Option<u32>,
    /// The size of every audio sample in bytes.
    pub sample_sizes: Vec<u32>,
    /// The time to sample runs describing every sample's duration.
    pub time_to_sample: Vec<SttsItem>,
    /// The number of samples stored in each chunk, in chunk order.
    pub samples_per_chunk: Vec<u32>,
    /// The absolute byte offset of each chunk in the source file.
    pub chunk_offsets: Vec<u64>,
    /// The verbatim payload of the source's metadata item list (`ilst`), if present.
    pub ilst: Option<Vec<u8>>,
    /// Whether a non-essential sample table box failed strict validation and a permissive
    /// reconstruction was used instead. Extraction results with this flag set are degraded
    /// confidence: byte locations are still consistent, but chunk grouping or sample timing was
    /// inferred rather than read.
    pub used_fallback_stbl: bool,
}

impl ParsedMp4 {
    /// Returns the number of audio samples.
    pub fn sample_count(&self) -> usize {
        self.sample_sizes.len()
    }

    /// Returns the audio duration in milliseconds, rounded up.
    pub fn duration_ms(&self) -> u64 {
        (self.duration * 1000 + self.timescale as u64 - 1) / self.timescale as u64
    }

    /// Returns the byte length of each chunk, derived from the samples per chunk plan and the
    /// sample sizes.
    pub(crate) fn chunk_byte_lens(&self) -> Vec<u64> {
        let mut lens = Vec::with_capacity(self.samples_per_chunk.len());
        let mut sample = 0;
        for count in self.samples_per_chunk.iter() {
            let mut len = 0u64;
            for _ in 0..*count {
                len += self.sample_sizes[sample] as u64;
                sample += 1;
            }
            lens.push(len);
        }
        lens
    }

    /// Returns a borrowed slice of the source buffer for every chunk, in chunk order. Offsets
    /// pointing outside the buffer are a structural error.
    pub(crate) fn audio_chunks<'a>(&self, buf: &'a [u8]) -> crate::Result<Vec<&'a [u8]>> {
        let lens = self.chunk_byte_lens();
        let mut chunks = Vec::with_capacity(lens.len());
        for (i, (offset, len)) in self.chunk_offsets.iter().zip(lens).enumerate() {
            let end = offset.checked_add(len).filter(|e| *e <= buf.len() as u64).ok_or_else(
                || {
                    Error::new(
                        ErrorKind::Parsing,
                        format!(
                            "Chunk {} at offset {} with {} bytes reaches past the end of the file",
                            i + 1,
                            offset,
                            len,
                        ),
                    )
                },
            )?;
            chunks.push(&buf[*offset as usize..end as usize]);
        }
        Ok(chunks)
    }
}

/// Parses the audio track and metadata of an MP4 buffer. See [`parse_mp4_with`].
pub fn parse_mp4(buf: &[u8]) -> crate::Result<ParsedMp4> {
    parse_mp4_with(buf, &NopLogger)
}

/// Parses the audio track and metadata of the MP4 file at the path.
pub fn parse_mp4_file(path: impl AsRef<Path>) -> crate::Result<ParsedMp4> {
    parse_mp4_file_with(path, &NopLogger)
}

/// Parses the audio track and metadata of the MP4 file at the path, reporting diagnostics to
/// the logger.
pub fn parse_mp4_file_with(path: impl AsRef<Path>, logger: &dyn Logger) -> crate::Result<ParsedMp4> {
    let buf = fs::read(path)?;
    parse_mp4_with(&buf, logger)
}

/// Parses the audio track and metadata of an MP4 buffer, reporting diagnostics to the logger.
///
/// The first track whose handler type is `soun` is selected. Inconsistencies in non-essential
/// sample table detail are recovered by conservative reconstruction and surfaced through
/// [`ParsedMp4::used_fallback_stbl`]; malformed essential boxes fail with a structural parse
/// error.
pub fn parse_mp4_with(buf: &[u8], logger: &dyn Logger) -> crate::Result<ParsedMp4> {
    let mut moov: Option<(&[u8], u64)> = None;

    for atom in AtomIter::new(buf, 0) {
        let atom = atom?;
        diag!(
            logger,
            Verbosity::Debug,
            "top-level atom '{}' at {} of {} bytes",
            atom.fourcc,
            atom.offset,
            atom.size.len(),
        );
        if atom.fourcc == MOVIE {
            moov = Some((atom.content(buf), atom.content_pos()));
        }
    }

    let (moov_span, moov_pos) = moov.ok_or_else(|| {
        Error::new(ErrorKind::AtomNotFound(MOVIE), "No movie (moov) atom found")
    })?;

    let mut audio: Option<TrackTables<'_>> = None;
    let mut ilst: Option<Vec<u8>> = None;

    for atom in AtomIter::new(moov_span, moov_pos) {
        let atom = atom?;
        match atom.fourcc {
            TRACK if audio.is_none() => {
                let track = parse_track(atom.content(moov_span), atom.content_pos(), logger)?;
                match track.handler {
                    Some(AUDIO_HANDLER) => audio = Some(track),
                    handler => diag!(
                        logger,
                        Verbosity::Debug,
                        "skipping track with handler {:?}",
                        handler,
                    ),
                }
            }
            USER_DATA => {
                let udta_span = atom.content(moov_span);
                for child in AtomIter::new(udta_span, atom.content_pos()) {
                    let child = child?;
                    if child.fourcc == METADATA && ilst.is_none() {
                        ilst = ilst_payload(child.content(udta_span), logger);
                    }
                }
            }
            // Some writers place meta directly under moov instead of inside udta.
            METADATA if ilst.is_none() => {
                ilst = ilst_payload(atom.content(moov_span), logger);
            }
            _ => (),
        }
    }

    let audio = audio.ok_or_else(|| {
        Error::new(ErrorKind::NoAudioTrack, "No track with an audio (soun) handler found")
    })?;

    let mut parsed = resolve_tables(audio, logger)?;
    parsed.ilst = ilst;

    diag!(
        logger,
        Verbosity::Debug,
        "parsed audio track: {} samples in {} chunks, duration {} / {}, fallback {}",
        parsed.sample_count(),
        parsed.chunk_offsets.len(),
        parsed.duration,
        parsed.timescale,
        parsed.used_fallback_stbl,
    );

    Ok(parsed)
}

/// The raw box payloads of one track, collected while searching for the audio track.
#[derive(Clone, Debug, Default)]
struct TrackTables<'a> {
    handler: Option<Fourcc>,
    mdhd: Option<Mdhd>,
    stsd: Option<&'a [u8]>,
    stts: Option<&'a [u8]>,
    stsc: Option<&'a [u8]>,
    stsz: Option<&'a [u8]>,
    offsets: Option<RawOffsets<'a>>,
}

#[derive(Clone, Copy, Debug)]
enum RawOffsets<'a> {
    Narrow(&'a [u8]),
    Wide(&'a [u8]),
}

fn parse_track<'a>(
    span: &'a [u8],
    base: u64,
    logger: &dyn Logger,
) -> crate::Result<TrackTables<'a>> {
    let mut track = TrackTables::default();

    for atom in AtomIter::new(span, base) {
        let atom = atom?;
        if atom.fourcc != MEDIA {
            continue;
        }

        let mdia_span = atom.content(span);
        for child in AtomIter::new(mdia_span, atom.content_pos()) {
            let child = child?;
            match child.fourcc {
                MEDIA_HEADER => track.mdhd = Some(Mdhd::parse(child.content(mdia_span))?),
                HANDLER_REFERENCE => {
                    track.handler = Hdlr::parse_handler_type(child.content(mdia_span));
                }
                MEDIA_INFORMATION => {
                    let minf_span = child.content(mdia_span);
                    for minf_child in AtomIter::new(minf_span, child.content_pos()) {
                        let minf_child = minf_child?;
                        if minf_child.fourcc == SAMPLE_TABLE {
                            parse_stbl(
                                &mut track,
                                minf_child.content(minf_span),
                                minf_child.content_pos(),
                                logger,
                            )?;
                        }
                    }
                }
                _ => (),
            }
        }
    }

    Ok(track)
}

fn parse_stbl<'a>(
    track: &mut TrackTables<'a>,
    span: &'a [u8],
    base: u64,
    logger: &dyn Logger,
) -> crate::Result<()> {
    for atom in AtomIter::new(span, base) {
        let atom = atom?;
        diag!(logger, Verbosity::Debug, "stbl child '{}' of {} bytes", atom.fourcc, atom.size.len());

        let content = atom.content(span);
        match atom.fourcc {
            SAMPLE_TABLE_SAMPLE_DESCRIPTION => track.stsd.get_or_insert(content),
            SAMPLE_TABLE_TIME_TO_SAMPLE => track.stts.get_or_insert(content),
            SAMPLE_TABLE_SAMPLE_TO_CHUNK => track.stsc.get_or_insert(content),
            SAMPLE_TABLE_SAMPLE_SIZE => track.stsz.get_or_insert(content),
            SAMPLE_TABLE_CHUNK_OFFSET => {
                track.offsets.get_or_insert(RawOffsets::Narrow(content));
                continue;
            }
            SAMPLE_TABLE_CHUNK_OFFSET_64 => {
                track.offsets.get_or_insert(RawOffsets::Wide(content));
                continue;
            }
            _ => continue,
        };
    }
    Ok(())
}

/// Decodes and cross-validates the collected table payloads of the selected audio track.
fn resolve_tables(track: TrackTables<'_>, logger: &dyn Logger) -> crate::Result<ParsedMp4> {
    let mdhd = track.mdhd.ok_or_else(|| {
        Error::new(ErrorKind::AtomNotFound(MEDIA_HEADER), "Audio track has no media header")
    })?;
    if mdhd.timescale == 0 {
        return Err(Error::new(ErrorKind::Parsing, "Audio track has a zero timescale"));
    }

    let stsd = track.stsd.ok_or_else(|| {
        Error::new(
            ErrorKind::AtomNotFound(SAMPLE_TABLE_SAMPLE_DESCRIPTION),
            "Audio track has no sample description",
        )
    })?;
    check_stsd(stsd)?;

    let stsz = Stsz::parse(track.stsz.ok_or_else(|| {
        Error::new(
            ErrorKind::AtomNotFound(SAMPLE_TABLE_SAMPLE_SIZE),
            "Audio track has no sample size table",
        )
    })?)?;
    let sample_count = stsz.sample_count as u64;

    let mut fallback = false;

    let offsets = match track.offsets {
        Some(RawOffsets::Narrow(data)) => {
            Stco::parse(data)?.offsets.iter().map(|o| *o as u64).collect::<Vec<u64>>()
        }
        Some(RawOffsets::Wide(data)) => Co64::parse(data)?.offsets,
        None => {
            return Err(Error::new(
                ErrorKind::AtomNotFound(SAMPLE_TABLE_CHUNK_OFFSET),
                "Audio track has no chunk offset table",
            ));
        }
    };

    let stts = match track.stts.map(Stts::parse) {
        Some(Ok(stts)) if stts.total_samples() == sample_count => stts,
        Some(Ok(stts)) => {
            diag!(
                logger,
                Verbosity::Warn,
                "time to sample total {} doesn't match {} samples, synthesizing uniform timing",
                stts.total_samples(),
                sample_count,
            );
            fallback = true;
            synthesize_stts(&mdhd, sample_count)
        }
        Some(Err(e)) => {
            diag!(logger, Verbosity::Warn, "unreadable time to sample table ({e}), synthesizing");
            fallback = true;
            synthesize_stts(&mdhd, sample_count)
        }
        None => {
            diag!(logger, Verbosity::Warn, "missing time to sample table, synthesizing");
            fallback = true;
            synthesize_stts(&mdhd, sample_count)
        }
    };

    let plan = match track.stsc.map(Stsc::parse) {
        Some(Ok(stsc)) => match stsc.plan(sample_count, offsets.len()) {
            Some(plan) => plan,
            None => {
                diag!(
                    logger,
                    Verbosity::Warn,
                    "inconsistent sample to chunk map, reconstructing chunk grouping",
                );
                fallback = true;
                reconstruct_plan(sample_count, offsets.len())?
            }
        },
        Some(Err(e)) => {
            diag!(logger, Verbosity::Warn, "unreadable sample to chunk map ({e}), reconstructing");
            fallback = true;
            reconstruct_plan(sample_count, offsets.len())?
        }
        None => {
            diag!(logger, Verbosity::Warn, "missing sample to chunk map, reconstructing");
            fallback = true;
            reconstruct_plan(sample_count, offsets.len())?
        }
    };

    Ok(ParsedMp4 {
        timescale: mdhd.timescale,
        duration: mdhd.duration,
        stsd: stsd.to_vec(),
        uniform_sample_size: match stsz.uniform_sample_size {
            0 => None,
            s => Some(s),
        },
        sample_sizes: stsz.expanded(),
        time_to_sample: stts.items,
        samples_per_chunk: plan,
        chunk_offsets: offsets,
        ilst: None,
        used_fallback_stbl: fallback,
    })
}

/// Validates that the sample description has a full box head and at least one entry. The
/// payload itself is treated as opaque.
fn check_stsd(data: &[u8]) -> crate::Result<()> {
    let (version, _) = parse_full_head(data, "Sample description (stsd)")?;
    if version != 0 {
        return Err(Error::new(
            ErrorKind::UnknownVersion(version),
            "Unknown sample description (stsd) version",
        ));
    }
    match read_be_u32(data, 4) {
        Some(0) | None => Err(Error::new(
            ErrorKind::Parsing,
            "Sample description (stsd) contains no entries",
        )),
        Some(_) => Ok(()),
    }
}

/// Synthesizes a single-run time to sample table spreading the media duration uniformly over
/// the samples.
fn synthesize_stts(mdhd: &Mdhd, sample_count: u64) -> Stts {
    let duration = mdhd.duration / sample_count.max(1);
    Stts::single_run(sample_count as u32, duration as u32)
}

/// Reconstructs a conservative samples-per-chunk plan when the sample to chunk map is unusable:
/// one sample per chunk when the chunk count matches, or a single chunk holding everything.
fn reconstruct_plan(sample_count: u64, chunk_count: usize) -> crate::Result<Vec<u32>> {
    if chunk_count as u64 == sample_count {
        Ok(vec![1; chunk_count])
    } else if chunk_count == 1 && sample_count > 0 {
        Ok(vec![sample_count as u32])
    } else {
        Err(Error::new(
            ErrorKind::Parsing,
            format!(
                "Cannot reconcile chunk layout: {chunk_count} chunks for {sample_count} samples",
            ),
        ))
    }
}

/// Extracts the verbatim `ilst` payload from a `meta` content span. The `meta` box is a full
/// box, but some writers insert 4 additional reserved bytes before the first child, so both
/// layouts are probed. Metadata is non-essential, unreadable spans yield `None`.
fn ilst_payload(span: &[u8], logger: &dyn Logger) -> Option<Vec<u8>> {
    if parse_full_head(span, "Metadata (meta)").is_err() {
        return None;
    }

    let find_ilst = |skip: usize| -> Option<Vec<u8>> {
        let children = span.get(skip..)?;
        for atom in AtomIter::new(children, skip as u64) {
            match atom {
                Ok(atom) if atom.fourcc == ITEM_LIST => {
                    return Some(atom.content(children).to_vec());
                }
                Ok(_) => (),
                Err(_) => return None,
            }
        }
        None
    };

    // Probe whether the bytes right after version and flags look like a child atom head.
    let iso_style = match (read_be_u32(span, 4), span.get(8..12)) {
        (Some(size), Some(fourcc)) => {
            let fourcc = Fourcc([fourcc[0], fourcc[1], fourcc[2], fourcc[3]]);
            size as u64 >= 8 && size as usize <= span.len() - 4 && fourcc.is_printable()
        }
        _ => false,
    };

    let payload = if iso_style {
        find_ilst(4).or_else(|| find_ilst(8))
    } else {
        find_ilst(8).or_else(|| find_ilst(4))
    };

    if let Some(p) = &payload {
        diag!(logger, Verbosity::Debug, "captured source ilst payload of {} bytes", p.len());
    }
    payload
}
