//! Helpers for building synthetic audio sources and walking the boxes of produced files.
#![allow(dead_code)]

/// Wraps content in a box with a 32 bit size field.
pub fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + content.len());
    out.extend_from_slice(&(content.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(content);
    out
}

pub fn be16(span: &[u8], idx: usize) -> u16 {
    u16::from_be_bytes([span[idx], span[idx + 1]])
}

pub fn be32(span: &[u8], idx: usize) -> u32 {
    u32::from_be_bytes([span[idx], span[idx + 1], span[idx + 2], span[idx + 3]])
}

pub fn be64(span: &[u8], idx: usize) -> u64 {
    let mut buf = [0; 8];
    buf.copy_from_slice(&span[idx..idx + 8]);
    u64::from_be_bytes(buf)
}

/// Returns the direct children of a container span as (fourcc, content) pairs.
pub fn children(span: &[u8]) -> Vec<([u8; 4], &[u8])> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos + 8 <= span.len() {
        let size = be32(span, pos) as usize;
        if size < 8 || pos + size > span.len() {
            break;
        }
        let mut fourcc = [0; 4];
        fourcc.copy_from_slice(&span[pos + 4..pos + 8]);
        out.push((fourcc, &span[pos + 8..pos + size]));
        pos += size;
    }
    out
}

/// Returns the content of every direct child with the fourcc.
pub fn find_all<'a>(span: &'a [u8], fourcc: &[u8; 4]) -> Vec<&'a [u8]> {
    children(span).into_iter().filter(|(f, _)| f == fourcc).map(|(_, c)| c).collect()
}

/// Descends a path of container boxes, taking the first match at every level.
pub fn find<'a>(span: &'a [u8], path: &[&[u8; 4]]) -> Option<&'a [u8]> {
    let mut span = span;
    for fourcc in path {
        span = *find_all(span, fourcc).first()?;
    }
    Some(span)
}

/// Options for the synthetic M4A builder.
pub struct Synth {
    pub timescale: u32,
    pub duration: u64,
    pub sample_sizes: Vec<u32>,
    /// Samples per chunk; also determines the physical chunk layout of the media data.
    pub samples_per_chunk: Vec<u32>,
    /// Write an stsc box that contradicts the physical layout.
    pub break_stsc: bool,
    /// Embed this payload as `udta/meta/ilst`.
    pub ilst: Option<Vec<u8>>,
}

impl Synth {
    pub fn new(timescale: u32, duration: u64, sample_sizes: Vec<u32>) -> Self {
        let samples_per_chunk = vec![1; sample_sizes.len()];
        Self { timescale, duration, sample_sizes, samples_per_chunk, break_stsc: false, ilst: None }
    }

    /// Builds a minimal valid M4A file and returns it together with the raw audio payload laid
    /// out in the media data box.
    pub fn build(&self) -> (Vec<u8>, Vec<u8>) {
        let sample_count = self.sample_sizes.len() as u32;

        // deterministic audio payload
        let mut payload = Vec::new();
        for (i, size) in self.sample_sizes.iter().enumerate() {
            payload.extend(std::iter::repeat(i as u8 ^ 0x5A).take(*size as usize));
        }

        let ftyp = {
            let mut c = Vec::new();
            c.extend_from_slice(b"M4A ");
            c.extend_from_slice(&0u32.to_be_bytes());
            c.extend_from_slice(b"isom");
            atom(b"ftyp", &c)
        };

        let moov_for = |chunk_offsets: &[u32]| -> Vec<u8> {
            let mvhd = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&[0; 8]); // creation/modification
                c.extend_from_slice(&600u32.to_be_bytes());
                c.extend_from_slice(&0u32.to_be_bytes());
                c.extend_from_slice(&vec![0; 80]);
                atom(b"mvhd", &c)
            };

            let mdhd = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&[0; 8]);
                c.extend_from_slice(&self.timescale.to_be_bytes());
                c.extend_from_slice(&(self.duration as u32).to_be_bytes());
                c.extend_from_slice(&[0x55, 0xC4, 0, 0]);
                atom(b"mdhd", &c)
            };

            let hdlr = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&0u32.to_be_bytes());
                c.extend_from_slice(b"soun");
                c.extend_from_slice(&[0; 12]);
                c.extend_from_slice(b"sound\0");
                atom(b"hdlr", &c)
            };

            let stsd = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&1u32.to_be_bytes());
                c.extend_from_slice(&atom(b"mp4a", &[0; 28]));
                atom(b"stsd", &c)
            };

            let stts = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&1u32.to_be_bytes());
                c.extend_from_slice(&sample_count.to_be_bytes());
                let dur = (self.duration / sample_count.max(1) as u64) as u32;
                c.extend_from_slice(&dur.to_be_bytes());
                atom(b"stts", &c)
            };

            let stsc = {
                let mut c = vec![0; 4];
                if self.break_stsc {
                    c.extend_from_slice(&1u32.to_be_bytes());
                    c.extend_from_slice(&1u32.to_be_bytes());
                    c.extend_from_slice(&999u32.to_be_bytes());
                    c.extend_from_slice(&1u32.to_be_bytes());
                } else {
                    // run-length encode the plan
                    let mut entries: Vec<(u32, u32)> = Vec::new();
                    for (i, samples) in self.samples_per_chunk.iter().enumerate() {
                        match entries.last() {
                            Some((_, s)) if s == samples => (),
                            _ => entries.push((i as u32 + 1, *samples)),
                        }
                    }
                    c.extend_from_slice(&(entries.len() as u32).to_be_bytes());
                    for (first, samples) in entries {
                        c.extend_from_slice(&first.to_be_bytes());
                        c.extend_from_slice(&samples.to_be_bytes());
                        c.extend_from_slice(&1u32.to_be_bytes());
                    }
                }
                atom(b"stsc", &c)
            };

            let stsz = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&0u32.to_be_bytes());
                c.extend_from_slice(&sample_count.to_be_bytes());
                for s in &self.sample_sizes {
                    c.extend_from_slice(&s.to_be_bytes());
                }
                atom(b"stsz", &c)
            };

            let stco = {
                let mut c = vec![0; 4];
                c.extend_from_slice(&(chunk_offsets.len() as u32).to_be_bytes());
                for o in chunk_offsets {
                    c.extend_from_slice(&o.to_be_bytes());
                }
                atom(b"stco", &c)
            };

            let mut stbl = Vec::new();
            stbl.extend_from_slice(&stsd);
            stbl.extend_from_slice(&stts);
            stbl.extend_from_slice(&stsc);
            stbl.extend_from_slice(&stsz);
            stbl.extend_from_slice(&stco);
            let stbl = atom(b"stbl", &stbl);

            let minf = atom(b"minf", &stbl);
            let mut mdia = Vec::new();
            mdia.extend_from_slice(&mdhd);
            mdia.extend_from_slice(&hdlr);
            mdia.extend_from_slice(&minf);
            let trak = atom(b"trak", &atom(b"mdia", &mdia));

            let mut moov = Vec::new();
            moov.extend_from_slice(&mvhd);
            moov.extend_from_slice(&trak);
            if let Some(ilst) = &self.ilst {
                let hdlr_meta = {
                    let mut c = vec![0; 4];
                    c.extend_from_slice(&0u32.to_be_bytes());
                    c.extend_from_slice(b"mdir");
                    c.extend_from_slice(&[0; 12]);
                    c.push(0);
                    atom(b"hdlr", &c)
                };
                let mut meta = vec![0; 4];
                meta.extend_from_slice(&hdlr_meta);
                meta.extend_from_slice(&atom(b"ilst", ilst));
                moov.extend_from_slice(&atom(b"udta", &atom(b"meta", &meta)));
            }
            atom(b"moov", &moov)
        };

        // two passes: measure moov with zeroed offsets, then fill in the real ones
        let moov_len = moov_for(&vec![0; self.samples_per_chunk.len()]).len();
        let payload_start = (ftyp.len() + moov_len + 8) as u32;

        let mut chunk_offsets = Vec::new();
        let mut cursor = payload_start;
        let mut sample = 0;
        for in_chunk in &self.samples_per_chunk {
            chunk_offsets.push(cursor);
            for _ in 0..*in_chunk {
                cursor += self.sample_sizes[sample];
                sample += 1;
            }
        }

        let mut file = ftyp;
        file.extend_from_slice(&moov_for(&chunk_offsets));
        file.extend_from_slice(&atom(b"mdat", &payload));
        (file, payload)
    }
}

/// Builds one ADTS frame (AAC LC, 44.1kHz, stereo, no CRC) around the payload.
pub fn adts_frame(payload: &[u8]) -> Vec<u8> {
    let len = payload.len() + 7;
    let mut frame = vec![0xFF, 0xF1, (1 << 6) | (4 << 2), 2 << 6, 0, 0, 0xFC];
    frame[3] |= ((len >> 11) & 0x03) as u8;
    frame[4] = ((len >> 3) & 0xFF) as u8;
    frame[5] |= ((len & 0x07) << 5) as u8;
    frame.extend_from_slice(payload);
    frame
}

/// Builds an ADTS stream of frames with deterministic payloads.
pub fn adts_stream(frame_count: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..frame_count {
        let payload = vec![i as u8; 10 + i % 5];
        data.extend_from_slice(&adts_frame(&payload));
    }
    data
}

/// A minimal JPEG header describing a 4:2:0 subsampled image.
pub fn jpeg_image(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(3);
    data.extend_from_slice(&[1, 0x22, 0, 2, 0x11, 0, 3, 0x11, 0]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A minimal PNG header.
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 2, 0, 0, 0]);
    data
}
