//! ENVI header parsing and raw cube decoding.
//!
//! An ENVI image is a pair of files: a plain-text `.hdr` header describing
//! the cube geometry, sample type and band wavelengths, and a headerless
//! binary data file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::models::SpectralDataset;

/// Extensions tried, in order, for the data file belonging to a header
const DATA_EXTENSIONS: [&str; 6] = ["raw", "img", "dat", "bil", "bsq", "bip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleave {
    Bsq,
    Bil,
    Bip,
}

impl Interleave {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bsq" => Some(Interleave::Bsq),
            "bil" => Some(Interleave::Bil),
            "bip" => Some(Interleave::Bip),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interleave::Bsq => "bsq",
            Interleave::Bil => "bil",
            Interleave::Bip => "bip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Sample types ENVI identifies by numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    U8,
    I16,
    I32,
    F32,
    F64,
    U16,
    U32,
    I64,
    U64,
}

impl DataType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(DataType::U8),
            2 => Some(DataType::I16),
            3 => Some(DataType::I32),
            4 => Some(DataType::F32),
            5 => Some(DataType::F64),
            12 => Some(DataType::U16),
            13 => Some(DataType::U32),
            14 => Some(DataType::I64),
            15 => Some(DataType::U64),
            _ => None,
        }
    }

    /// Bytes per sample
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 | DataType::F32 => 4,
            DataType::F64 | DataType::I64 | DataType::U64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "uint8",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
            DataType::U16 => "uint16",
            DataType::U32 => "uint32",
            DataType::I64 => "int64",
            DataType::U64 => "uint64",
        }
    }

    /// Decode one sample; `bytes` must be at least `self.size()` long
    fn decode(&self, bytes: &[u8], endian: Endian) -> f32 {
        match endian {
            Endian::Little => self.decode_as::<LittleEndian>(bytes),
            Endian::Big => self.decode_as::<BigEndian>(bytes),
        }
    }

    fn decode_as<B: ByteOrder>(&self, bytes: &[u8]) -> f32 {
        match self {
            DataType::U8 => bytes[0] as f32,
            DataType::I16 => B::read_i16(bytes) as f32,
            DataType::U16 => B::read_u16(bytes) as f32,
            DataType::I32 => B::read_i32(bytes) as f32,
            DataType::U32 => B::read_u32(bytes) as f32,
            DataType::F32 => B::read_f32(bytes),
            DataType::F64 => B::read_f64(bytes) as f32,
            DataType::I64 => B::read_i64(bytes) as f32,
            DataType::U64 => B::read_u64(bytes) as f32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnviHeader {
    pub samples: u32,
    pub lines: u32,
    pub bands: usize,
    pub header_offset: usize,
    pub data_type: DataType,
    pub interleave: Interleave,
    pub byte_order: Endian,
    /// Band centres converted to nanometres
    pub wavelengths: Vec<f32>,
    pub wavelength_units: String,
    /// Zero-based red, green and blue bands
    pub default_bands: Option<[usize; 3]>,
}

impl EnviHeader {
    /// Number of bytes the data file must hold, or `None` if that overflows
    pub fn data_len(&self) -> Option<usize> {
        (self.samples as usize)
            .checked_mul(self.lines as usize)?
            .checked_mul(self.bands)?
            .checked_mul(self.data_type.size())?
            .checked_add(self.header_offset)
    }
}

/// Parse the text of an ENVI `.hdr` file
pub fn parse_header(text: &str) -> std::result::Result<EnviHeader, String> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.lines().skip_while(|l| l.trim().is_empty());

    match lines.next() {
        Some(first) if first.trim().eq_ignore_ascii_case("ENVI") => {}
        _ => return Err("missing ENVI signature".to_string()),
    }

    let fields = collect_fields(lines)?;

    let samples = required_number(&fields, "samples")?;
    let lines_count = required_number(&fields, "lines")?;
    let bands = required_number(&fields, "bands")? as usize;
    let code = required_number(&fields, "data type")?;
    let data_type =
        DataType::from_code(code).ok_or_else(|| format!("unsupported data type {code}"))?;

    let interleave = match fields.get("interleave") {
        Some(s) => Interleave::parse(s).ok_or_else(|| format!("unknown interleave '{s}'"))?,
        None => Interleave::Bsq,
    };
    let header_offset = optional_number(&fields, "header offset")?.unwrap_or(0) as usize;
    let byte_order = match optional_number(&fields, "byte order")?.unwrap_or(0) {
        0 => Endian::Little,
        1 => Endian::Big,
        other => return Err(format!("invalid byte order {other}")),
    };

    let wavelength_units = fields
        .get("wavelength units")
        .cloned()
        .unwrap_or_else(|| "nm".to_string());
    let to_nm = if is_micrometres(&wavelength_units) { 1000.0 } else { 1.0 };

    let wavelengths = match fields.get("wavelength") {
        Some(list) => {
            let values = parse_list(list)
                .map_err(|tok| format!("invalid wavelength '{tok}'"))?;
            if values.len() != bands {
                return Err(format!(
                    "{} wavelengths listed for {} bands",
                    values.len(),
                    bands
                ));
            }
            values.into_iter().map(|w| w * to_nm).collect()
        }
        None => Vec::new(),
    };

    let default_bands = fields
        .get("default bands")
        .and_then(|list| parse_list(list).ok())
        .and_then(|list| one_based_rgb(&list, bands));

    Ok(EnviHeader {
        samples,
        lines: lines_count,
        bands,
        header_offset,
        data_type,
        interleave,
        byte_order,
        wavelengths,
        wavelength_units: if to_nm == 1.0 {
            wavelength_units
        } else {
            "nm".to_string()
        },
        default_bands,
    })
}

/// Gather `key = value` pairs, joining `{ ... }` values that span lines
fn collect_fields<'a>(
    lines: impl Iterator<Item = &'a str>,
) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut fields = BTreeMap::new();
    let mut pending: Option<(String, String)> = None;

    for line in lines {
        if let Some((key, mut value)) = pending.take() {
            value.push(' ');
            value.push_str(line.trim());
            if value.contains('}') {
                fields.insert(key, strip_braces(&value));
            } else {
                pending = Some((key, value));
            }
            continue;
        }

        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        if value.starts_with('{') && !value.contains('}') {
            pending = Some((key, value));
        } else {
            fields.insert(key, strip_braces(&value));
        }
    }

    match pending {
        Some((key, _)) => Err(format!("unterminated value for '{key}'")),
        None => Ok(fields),
    }
}

fn strip_braces(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .to_string()
}

fn required_number(fields: &BTreeMap<String, String>, key: &str) -> std::result::Result<u32, String> {
    optional_number(fields, key)?.ok_or_else(|| format!("header is missing '{key}'"))
}

fn optional_number(
    fields: &BTreeMap<String, String>,
    key: &str,
) -> std::result::Result<Option<u32>, String> {
    fields
        .get(key)
        .map(|v| v.parse::<u32>().map_err(|_| format!("invalid {key} '{v}'")))
        .transpose()
}

fn parse_list(list: &str) -> std::result::Result<Vec<f32>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| tok.parse::<f32>().map_err(|_| tok.to_string()))
        .collect()
}

fn is_micrometres(units: &str) -> bool {
    let units = units.trim().to_ascii_lowercase();
    units.starts_with("micro") || units == "um" || units == "µm"
}

fn one_based_rgb(list: &[f32], bands: usize) -> Option<[usize; 3]> {
    let to_index = |v: f32| {
        let i = v as usize;
        (i >= 1 && i <= bands).then(|| i - 1)
    };
    match list {
        [r, g, b] => Some([to_index(*r)?, to_index(*g)?, to_index(*b)?]),
        [gray] => to_index(*gray).map(|i| [i; 3]),
        _ => None,
    }
}

/// Find the header/data file pair for `path`, if it belongs to an ENVI image
pub fn locate(path: &Path) -> Result<Option<(PathBuf, PathBuf)>> {
    let is_header = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hdr"));

    if is_header {
        let stem = path.with_extension("");
        let data = std::iter::once(stem.clone())
            .chain(DATA_EXTENSIONS.iter().map(|ext| stem.with_extension(ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::unreadable(path, "no data file found next to header"))?;
        return Ok(Some((path.to_path_buf(), data)));
    }

    let mut appended = path.as_os_str().to_owned();
    appended.push(".hdr");
    let header = [PathBuf::from(appended), path.with_extension("hdr")]
        .into_iter()
        .find(|candidate| candidate.is_file());

    Ok(header.map(|h| (h, path.to_path_buf())))
}

/// Read a cube from its header and data file
pub fn read(header_path: &Path, data_path: &Path, filename: &Path) -> Result<SpectralDataset> {
    let text = std::fs::read_to_string(header_path)
        .map_err(|e| Error::unreadable(header_path, e.to_string()))?;
    let header = parse_header(&text).map_err(|reason| Error::unreadable(header_path, reason))?;

    log::debug!(
        "ENVI header: {}x{}x{} {} {}",
        header.samples,
        header.lines,
        header.bands,
        header.data_type.name(),
        header.interleave.as_str()
    );

    let bytes =
        std::fs::read(data_path).map_err(|e| Error::unreadable(data_path, e.to_string()))?;
    let required = header
        .data_len()
        .ok_or_else(|| Error::unreadable(header_path, "cube dimensions overflow"))?;
    if bytes.len() < required {
        return Err(Error::unreadable(
            data_path,
            format!("data file holds {} bytes, header requires {required}", bytes.len()),
        ));
    }

    let data = decode_cube(&header, &bytes[header.header_offset..]);

    let mut dataset = SpectralDataset::from_bands(
        filename,
        header.samples,
        header.lines,
        data,
        header.wavelengths.clone(),
        header.default_bands,
    );
    dataset.bands = header.bands;
    dataset.wavelength_units = header.wavelength_units.clone();
    dataset.data_type = header.data_type.name().to_string();
    dataset.interleave = header.interleave.as_str().to_string();
    Ok(dataset)
}

/// Write a float32 little-endian BSQ cube as `<stem>.hdr` + `<stem>.raw`
///
/// `data` is band-sequential. Returns the header and data paths.
pub fn write(
    stem: &Path,
    width: u32,
    height: u32,
    wavelengths: &[f32],
    data: &[f32],
) -> Result<(PathBuf, PathBuf)> {
    let header_path = stem.with_extension("hdr");
    let data_path = stem.with_extension("raw");
    let bands = wavelengths.len();

    if data.len() != width as usize * height as usize * bands {
        return Err(Error::write_failure(
            &data_path,
            format!("{} samples do not fill a {width}x{height}x{bands} cube", data.len()),
        ));
    }

    let wavelength_list = wavelengths
        .iter()
        .map(|w| format!("{w:.6}"))
        .collect::<Vec<_>>()
        .join(",\n ");
    let header = format!(
        "ENVI\n\
         samples = {width}\n\
         lines = {height}\n\
         bands = {bands}\n\
         header offset = 0\n\
         file type = ENVI Standard\n\
         data type = 4\n\
         interleave = bsq\n\
         byte order = 0\n\
         wavelength units = nm\n\
         wavelength = {{\n {wavelength_list}}}\n"
    );

    if let Some(parent) = stem.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write_failure(parent, e))?;
    }
    std::fs::write(&header_path, header).map_err(|e| Error::write_failure(&header_path, e))?;

    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
    std::fs::write(&data_path, bytes).map_err(|e| Error::write_failure(&data_path, e))?;

    Ok((header_path, data_path))
}

/// Decode raw samples into band-sequential order
fn decode_cube(header: &EnviHeader, bytes: &[u8]) -> Vec<f32> {
    let samples = header.samples as usize;
    let lines = header.lines as usize;
    let bands = header.bands;
    let size = header.data_type.size();
    let mut out = vec![0.0f32; samples * lines * bands];

    for b in 0..bands {
        for l in 0..lines {
            for s in 0..samples {
                let src = match header.interleave {
                    Interleave::Bsq => (b * lines + l) * samples + s,
                    Interleave::Bil => (l * bands + b) * samples + s,
                    Interleave::Bip => (l * samples + s) * bands + b,
                };
                let offset = src * size;
                out[(b * lines + l) * samples + s] = header
                    .data_type
                    .decode(&bytes[offset..offset + size], header.byte_order);
            }
        }
    }

    out
}
