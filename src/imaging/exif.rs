//! Minimal EXIF reader and allowlisted copier for JPEG and TIFF files.
//!
//! Three jobs:
//! - read the Orientation tag (0x0112) from IFD0
//! - list the allowlisted tags present, for `info`
//! - build a fresh APP1 Exif segment holding only allowlisted tags, with
//!   Orientation reset to 1, and splice it into an encoded JPEG
//!
//! For JPEG the TIFF structure lives in an APP1 segment after the
//! `Exif\0\0` header. A TIFF file *is* the structure. Values are copied
//! byte-for-byte in the source byte order, so nothing is reinterpreted.
//! Anything unreadable is an [`ExifError`]; callers treat those as
//! non-fatal.

use super::orientation::Orientation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExifError {
    #[error("cannot read source: {0}")]
    Unreadable(String),
    #[error("no EXIF data found")]
    NotFound,
    #[error("malformed EXIF data: {0}")]
    Malformed(&'static str),
    #[error("destination is not a JPEG stream")]
    NotJpeg,
    #[error("EXIF block of {0} bytes does not fit in one APP1 segment")]
    TooLarge(usize),
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_GPS_IFD: u16 = 0x8825;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

/// Which directory a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ifd {
    Primary,
    Exif,
    Gps,
}

/// Tags carried over to resized output, with display names.
const PRIMARY_TAGS: &[(u16, &str)] = &[
    (0x010F, "Make"),
    (0x0110, "Model"),
    (0x0132, "DateTime"),
    (0x013B, "Artist"),
    (0x8298, "Copyright"),
];

const EXIF_TAGS: &[(u16, &str)] = &[
    (0x829A, "ExposureTime"),
    (0x829D, "FNumber"),
    (0x8822, "ExposureProgram"),
    (0x8827, "ISOSpeedRatings"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (0x9010, "OffsetTime"),
    (0x9011, "OffsetTimeOriginal"),
    (0x9012, "OffsetTimeDigitized"),
    (0x9201, "ShutterSpeedValue"),
    (0x9202, "ApertureValue"),
    (0x9204, "ExposureBiasValue"),
    (0x9207, "MeteringMode"),
    (0x9209, "Flash"),
    (0x920A, "FocalLength"),
    (0x9290, "SubSecTime"),
    (0x9291, "SubSecTimeOriginal"),
    (0x9292, "SubSecTimeDigitized"),
    (0xA403, "WhiteBalance"),
    (0xA405, "FocalLengthIn35mmFilm"),
    (0xA433, "LensMake"),
    (0xA434, "LensModel"),
];

const GPS_TAGS: &[(u16, &str)] = &[
    (0x0000, "GPSVersionID"),
    (0x0001, "GPSLatitudeRef"),
    (0x0002, "GPSLatitude"),
    (0x0003, "GPSLongitudeRef"),
    (0x0004, "GPSLongitude"),
    (0x0005, "GPSAltitudeRef"),
    (0x0006, "GPSAltitude"),
    (0x0007, "GPSTimeStamp"),
    (0x001D, "GPSDateStamp"),
];

fn allowlist(ifd: Ifd) -> &'static [(u16, &'static str)] {
    match ifd {
        Ifd::Primary => PRIMARY_TAGS,
        Ifd::Exif => EXIF_TAGS,
        Ifd::Gps => GPS_TAGS,
    }
}

/// Display name of an allowlisted tag.
pub fn tag_name(ifd: Ifd, tag: u16) -> Option<&'static str> {
    allowlist(ifd)
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// Locating the TIFF structure
// ---------------------------------------------------------------------------

/// Return the TIFF structure inside a JPEG or TIFF file.
fn tiff_payload(data: &[u8]) -> Result<&[u8], ExifError> {
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return Ok(data);
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        return find_jpeg_app1_exif(data).ok_or(ExifError::NotFound);
    }
    Err(ExifError::NotFound)
}

/// Find the TIFF bytes inside a JPEG's APP1 Exif segment.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes between markers
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) means image data starts; EOI ends the stream
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xE1 && data[seg_start..seg_end].starts_with(EXIF_HEADER) {
            return Some(&data[seg_start + EXIF_HEADER.len()..seg_end]);
        }
        pos += 2 + seg_len;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        }
    }

    fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        }
    }

    fn put_u16(self, out: &mut Vec<u8>, v: u16) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn put_u32(self, out: &mut Vec<u8>, v: u32) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
        }
    }
}

/// Bytes per value for a TIFF field type.
fn type_size(typ: u16) -> usize {
    match typ {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

/// One directory entry with its value bytes resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    tag: u16,
    typ: u16,
    count: u32,
    /// Raw value bytes in the source byte order, `count * type_size` long.
    value: Vec<u8>,
}

struct Tiff<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Tiff<'a> {
    fn parse(data: &'a [u8]) -> Result<Self, ExifError> {
        let order = match data.get(0..2) {
            Some(b"II") => ByteOrder::Little,
            Some(b"MM") => ByteOrder::Big,
            _ => return Err(ExifError::Malformed("missing byte order mark")),
        };
        let tiff = Self { data, order };
        if tiff.u16_at(2)? != 42 {
            return Err(ExifError::Malformed("bad TIFF magic"));
        }
        Ok(tiff)
    }

    fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], ExifError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(ExifError::Malformed("offset past end of data"))
    }

    fn u16_at(&self, offset: usize) -> Result<u16, ExifError> {
        let b = self.bytes(offset, 2)?;
        Ok(self.order.u16([b[0], b[1]]))
    }

    fn u32_at(&self, offset: usize) -> Result<u32, ExifError> {
        let b = self.bytes(offset, 4)?;
        Ok(self.order.u32([b[0], b[1], b[2], b[3]]))
    }

    fn ifd0_offset(&self) -> Result<usize, ExifError> {
        Ok(self.u32_at(4)? as usize)
    }

    /// All entries of the directory at `offset`.
    fn fields(&self, offset: usize) -> Result<Vec<Field>, ExifError> {
        let count = self.u16_at(offset)? as usize;
        let mut fields = Vec::with_capacity(count);
        for i in 0..count {
            let entry = offset + 2 + i * 12;
            let tag = self.u16_at(entry)?;
            let typ = self.u16_at(entry + 2)?;
            let n = self.u32_at(entry + 4)?;
            let len = (n as usize)
                .checked_mul(type_size(typ))
                .ok_or(ExifError::Malformed("value length overflow"))?;
            // Values of up to four bytes sit in the entry itself.
            let value = if len <= 4 {
                self.bytes(entry + 8, len)?
            } else {
                self.bytes(self.u32_at(entry + 8)? as usize, len)?
            };
            fields.push(Field {
                tag,
                typ,
                count: n,
                value: value.to_vec(),
            });
        }
        Ok(fields)
    }

    /// Offset stored in a LONG pointer field such as the Exif IFD pointer.
    fn pointer(&self, field: &Field) -> Option<usize> {
        let b = field.value.get(0..4)?;
        Some(self.order.u32([b[0], b[1], b[2], b[3]]) as usize)
    }

    fn allowlisted(&self, ifd: Ifd, fields: Vec<Field>) -> Vec<Field> {
        fields
            .into_iter()
            .filter(|f| tag_name(ifd, f.tag).is_some())
            .collect()
    }

    /// Allowlisted fields of IFD0 and the Exif and GPS sub-directories.
    /// Unreadable sub-directories are skipped.
    fn collect(&self) -> Result<Vec<(Ifd, Vec<Field>)>, ExifError> {
        let ifd0 = self.fields(self.ifd0_offset()?)?;
        let sub = |tag: u16, ifd: Ifd| {
            ifd0.iter()
                .find(|f| f.tag == tag)
                .and_then(|f| self.pointer(f))
                .and_then(|offset| self.fields(offset).ok())
                .map(|fields| (ifd, self.allowlisted(ifd, fields)))
        };
        let exif = sub(TAG_EXIF_IFD, Ifd::Exif);
        let gps = sub(TAG_GPS_IFD, Ifd::Gps);

        let mut out = vec![(Ifd::Primary, self.allowlisted(Ifd::Primary, ifd0))];
        out.extend(exif);
        out.extend(gps);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Public reading API
// ---------------------------------------------------------------------------

/// Orientation recorded in a JPEG or TIFF file's bytes.
pub fn read_orientation(data: &[u8]) -> Result<Orientation, ExifError> {
    let tiff = Tiff::parse(tiff_payload(data)?)?;
    let ifd0 = tiff.fields(tiff.ifd0_offset()?)?;
    let value = ifd0
        .iter()
        .find(|f| f.tag == TAG_ORIENTATION && f.typ == TYPE_SHORT)
        .and_then(|f| f.value.get(0..2))
        .map(|b| tiff.order.u16([b[0], b[1]]))
        .ok_or(ExifError::NotFound)?;
    Ok(Orientation::from_exif(value))
}

/// An allowlisted tag found in a file, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifField {
    pub ifd: Ifd,
    pub name: &'static str,
    pub value: String,
}

/// List the allowlisted tags present in a JPEG or TIFF file's bytes.
pub fn read_fields(data: &[u8]) -> Result<Vec<ExifField>, ExifError> {
    let tiff = Tiff::parse(tiff_payload(data)?)?;
    let mut out = Vec::new();
    for (ifd, fields) in tiff.collect()? {
        for field in fields {
            if let Some(name) = tag_name(ifd, field.tag) {
                out.push(ExifField {
                    ifd,
                    name,
                    value: render(&field, tiff.order),
                });
            }
        }
    }
    Ok(out)
}

fn render(field: &Field, order: ByteOrder) -> String {
    let v = &field.value;
    match field.typ {
        2 => String::from_utf8_lossy(v)
            .trim_end_matches('\0')
            .trim()
            .to_string(),
        3 => v
            .chunks_exact(2)
            .map(|c| order.u16([c[0], c[1]]).to_string())
            .collect::<Vec<_>>()
            .join(", "),
        4 => v
            .chunks_exact(4)
            .map(|c| order.u32([c[0], c[1], c[2], c[3]]).to_string())
            .collect::<Vec<_>>()
            .join(", "),
        5 | 10 => v
            .chunks_exact(8)
            .map(|c| {
                let num = order.u32([c[0], c[1], c[2], c[3]]);
                let den = order.u32([c[4], c[5], c[6], c[7]]);
                if field.typ == 10 {
                    format!("{}/{}", num as i32, den as i32)
                } else {
                    format!("{num}/{den}")
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
        1 | 7 if v.len() <= 8 => v
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join("."),
        _ => format!("<{} bytes>", v.len()),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Directory bytes: count, entries, next-IFD offset, then out-of-line values.
fn ifd_size(fields: &[Field]) -> usize {
    let data: usize = fields
        .iter()
        .filter(|f| f.value.len() > 4)
        .map(|f| f.value.len() + f.value.len() % 2)
        .sum();
    2 + fields.len() * 12 + 4 + data
}

/// Append one directory starting at `out.len()` (which must equal its
/// TIFF offset). Fields must be sorted by tag.
fn write_ifd(out: &mut Vec<u8>, order: ByteOrder, fields: &[Field]) {
    let start = out.len();
    let mut data_offset = start + 2 + fields.len() * 12 + 4;
    let mut data = Vec::new();

    order.put_u16(out, fields.len() as u16);
    for f in fields {
        order.put_u16(out, f.tag);
        order.put_u16(out, f.typ);
        order.put_u32(out, f.count);
        if f.value.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..f.value.len()].copy_from_slice(&f.value);
            out.extend_from_slice(&inline);
        } else {
            order.put_u32(out, data_offset as u32);
            data.extend_from_slice(&f.value);
            if f.value.len() % 2 == 1 {
                data.push(0);
            }
            data_offset += f.value.len() + f.value.len() % 2;
        }
    }
    order.put_u32(out, 0);
    out.extend_from_slice(&data);
}

fn short_field(order: ByteOrder, tag: u16, v: u16) -> Field {
    let mut value = Vec::with_capacity(2);
    order.put_u16(&mut value, v);
    Field {
        tag,
        typ: TYPE_SHORT,
        count: 1,
        value,
    }
}

fn long_field(order: ByteOrder, tag: u16, v: u32) -> Field {
    let mut value = Vec::with_capacity(4);
    order.put_u32(&mut value, v);
    Field {
        tag,
        typ: TYPE_LONG,
        count: 1,
        value,
    }
}

/// Build a TIFF structure holding only allowlisted tags from `source`,
/// with Orientation = 1, in the source byte order.
fn build_tiff(source: &Tiff<'_>) -> Result<Vec<u8>, ExifError> {
    let order = source.order;
    let mut primary = Vec::new();
    let mut exif = Vec::new();
    let mut gps = Vec::new();
    for (ifd, fields) in source.collect()? {
        match ifd {
            Ifd::Primary => primary = fields,
            Ifd::Exif => exif = fields,
            Ifd::Gps => gps = fields,
        }
    }

    primary.push(short_field(order, TAG_ORIENTATION, 1));
    // Placeholders; the real offsets depend on the IFD0 size.
    if !exif.is_empty() {
        primary.push(long_field(order, TAG_EXIF_IFD, 0));
    }
    if !gps.is_empty() {
        primary.push(long_field(order, TAG_GPS_IFD, 0));
    }
    primary.sort_by_key(|f| f.tag);

    let exif_offset = 8 + ifd_size(&primary);
    let gps_offset = exif_offset + if exif.is_empty() { 0 } else { ifd_size(&exif) };
    for f in &mut primary {
        match f.tag {
            TAG_EXIF_IFD => *f = long_field(order, TAG_EXIF_IFD, exif_offset as u32),
            TAG_GPS_IFD => *f = long_field(order, TAG_GPS_IFD, gps_offset as u32),
            _ => {}
        }
    }
    exif.sort_by_key(|f| f.tag);
    gps.sort_by_key(|f| f.tag);

    let mut out = Vec::new();
    match order {
        ByteOrder::Little => out.extend_from_slice(b"II"),
        ByteOrder::Big => out.extend_from_slice(b"MM"),
    }
    order.put_u16(&mut out, 42);
    order.put_u32(&mut out, 8);
    write_ifd(&mut out, order, &primary);
    if !exif.is_empty() {
        write_ifd(&mut out, order, &exif);
    }
    if !gps.is_empty() {
        write_ifd(&mut out, order, &gps);
    }
    Ok(out)
}

/// Copy the allowlisted EXIF tags of `source` (JPEG or TIFF bytes) into the
/// encoded JPEG `dest`, returning the new JPEG bytes.
///
/// Any Exif APP1 already in `dest` is replaced. The new segment goes right
/// after SOI, or after a leading JFIF APP0 when there is one.
pub fn copy_exif(source: &[u8], dest: &[u8]) -> Result<Vec<u8>, ExifError> {
    if !dest.starts_with(&[0xFF, 0xD8]) {
        return Err(ExifError::NotJpeg);
    }
    let tiff = build_tiff(&Tiff::parse(tiff_payload(source)?)?)?;

    let seg_len = 2 + EXIF_HEADER.len() + tiff.len();
    if seg_len > u16::MAX as usize {
        return Err(ExifError::TooLarge(seg_len));
    }
    let mut segment = Vec::with_capacity(seg_len + 2);
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&(seg_len as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(dest.len() + segment.len());
    out.extend_from_slice(&dest[..2]);
    let mut pos = 2;
    let mut inserted = false;
    // Walk the header segments up to SOS, dropping old Exif blocks.
    while pos + 4 <= dest.len() && dest[pos] == 0xFF {
        let marker = dest[pos + 1];
        if marker == 0xDA || !(0xC0..=0xFE).contains(&marker) {
            break;
        }
        let len = u16::from_be_bytes([dest[pos + 2], dest[pos + 3]]) as usize;
        let end = (pos + 2 + len).min(dest.len());
        let body = &dest[(pos + 4).min(end)..end];
        if !inserted && marker != 0xE0 {
            out.extend_from_slice(&segment);
            inserted = true;
        }
        if !(marker == 0xE1 && body.starts_with(EXIF_HEADER)) {
            out.extend_from_slice(&dest[pos..end]);
        }
        pos = end;
    }
    if !inserted {
        out.extend_from_slice(&segment);
    }
    out.extend_from_slice(&dest[pos..]);
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Little-endian TIFF with IFD0 {Make "Cam", Orientation 6, ExifIFD}
    /// and an Exif IFD {ExposureTime 1/200, MakerNote (not allowlisted)}.
    pub(crate) fn sample_tiff() -> Vec<u8> {
        let order = ByteOrder::Little;
        let mut out = b"II".to_vec();
        order.put_u16(&mut out, 42);
        order.put_u32(&mut out, 8);

        // IFD0 at 8: 3 entries → 2 + 36 + 4 = 42 bytes, ends at 50
        let exif_at = 50u32;
        order.put_u16(&mut out, 3);
        // Make, ASCII, 4 bytes inline "Cam\0"
        order.put_u16(&mut out, 0x010F);
        order.put_u16(&mut out, 2);
        order.put_u32(&mut out, 4);
        out.extend_from_slice(b"Cam\0");
        // Orientation SHORT 6
        order.put_u16(&mut out, TAG_ORIENTATION);
        order.put_u16(&mut out, TYPE_SHORT);
        order.put_u32(&mut out, 1);
        order.put_u16(&mut out, 6);
        order.put_u16(&mut out, 0);
        // Exif pointer
        order.put_u16(&mut out, TAG_EXIF_IFD);
        order.put_u16(&mut out, TYPE_LONG);
        order.put_u32(&mut out, 1);
        order.put_u32(&mut out, exif_at);
        order.put_u32(&mut out, 0);
        assert_eq!(out.len(), exif_at as usize);

        // Exif IFD at 50: 2 entries → 2 + 24 + 4 = 30, data at 80
        order.put_u16(&mut out, 2);
        order.put_u16(&mut out, 0x829A);
        order.put_u16(&mut out, 5);
        order.put_u32(&mut out, 1);
        order.put_u32(&mut out, 80);
        order.put_u16(&mut out, 0x927C);
        order.put_u16(&mut out, 7);
        order.put_u32(&mut out, 4);
        out.extend_from_slice(b"junk");
        order.put_u32(&mut out, 0);
        assert_eq!(out.len(), 80);
        order.put_u32(&mut out, 1);
        order.put_u32(&mut out, 200);
        out
    }

    pub(crate) fn jpeg_with_app1(tiff: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        let len = (2 + EXIF_HEADER.len() + tiff.len()) as u16;
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(EXIF_HEADER);
        out.extend_from_slice(tiff);
        out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x11, 0x22, 0xFF, 0xD9]);
        out
    }

    fn bare_jpeg() -> Vec<u8> {
        // SOI, APP0 JFIF (len 16), SOS stub, EOI
        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        out.extend_from_slice(b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xAB, 0xFF, 0xD9]);
        out
    }

    // =========================================================================
    // Reading
    // =========================================================================

    #[test]
    fn orientation_from_tiff_and_jpeg() {
        let tiff = sample_tiff();
        assert_eq!(read_orientation(&tiff).unwrap(), Orientation::Rotate90);
        assert_eq!(
            read_orientation(&jpeg_with_app1(&tiff)).unwrap(),
            Orientation::Rotate90
        );
    }

    #[test]
    fn orientation_missing_is_not_found() {
        assert_eq!(read_orientation(&bare_jpeg()), Err(ExifError::NotFound));
        assert_eq!(read_orientation(b"GIF89a"), Err(ExifError::NotFound));
    }

    #[test]
    fn truncated_tiff_is_malformed() {
        let tiff = sample_tiff();
        let err = read_orientation(&tiff[..20]).unwrap_err();
        assert!(matches!(err, ExifError::Malformed(_)));
    }

    #[test]
    fn fields_list_only_allowlisted_tags() {
        let fields = read_fields(&sample_tiff()).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Make", "ExposureTime"]);
        assert_eq!(fields[0].value, "Cam");
        assert_eq!(fields[1].value, "1/200");
        assert_eq!(fields[1].ifd, Ifd::Exif);
    }

    // =========================================================================
    // Copying
    // =========================================================================

    #[test]
    fn copy_resets_orientation_and_keeps_allowlist() {
        let out = copy_exif(&sample_tiff(), &bare_jpeg()).unwrap();
        assert_eq!(read_orientation(&out).unwrap(), Orientation::Normal);

        let names: Vec<_> = read_fields(&out).unwrap().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Make", "ExposureTime"]);
        let payload = find_jpeg_app1_exif(&out).unwrap();
        assert!(!payload.windows(4).any(|w| w == b"junk"));
    }

    #[test]
    fn copy_inserts_after_jfif() {
        let dest = bare_jpeg();
        let out = copy_exif(&jpeg_with_app1(&sample_tiff()), &dest).unwrap();
        // SOI, APP0 unchanged, then APP1
        assert_eq!(&out[..20], &dest[..20]);
        assert_eq!(&out[20..22], &[0xFF, 0xE1]);
        assert!(out.ends_with(&[0xFF, 0xDA, 0x00, 0x02, 0xAB, 0xFF, 0xD9]));
    }

    #[test]
    fn copy_replaces_existing_exif() {
        let dest = jpeg_with_app1(&sample_tiff());
        let out = copy_exif(&sample_tiff(), &dest).unwrap();
        let app1_count = out
            .windows(2 + EXIF_HEADER.len())
            .filter(|w| w[..2] == [0xFF, 0xE1])
            .count();
        assert_eq!(app1_count, 1);
        assert_eq!(read_orientation(&out).unwrap(), Orientation::Normal);
    }

    #[test]
    fn copy_keeps_big_endian_order() {
        // Minimal big-endian TIFF: IFD0 with only Artist "Ann\0"
        let order = ByteOrder::Big;
        let mut src = b"MM".to_vec();
        order.put_u16(&mut src, 42);
        order.put_u32(&mut src, 8);
        order.put_u16(&mut src, 1);
        order.put_u16(&mut src, 0x013B);
        order.put_u16(&mut src, 2);
        order.put_u32(&mut src, 4);
        src.extend_from_slice(b"Ann\0");
        order.put_u32(&mut src, 0);

        let out = copy_exif(&src, &bare_jpeg()).unwrap();
        let payload = find_jpeg_app1_exif(&out).unwrap();
        assert!(payload.starts_with(b"MM\0*"));
        let fields = read_fields(&out).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Artist");
        assert_eq!(fields[0].value, "Ann");
    }

    #[test]
    fn copy_without_source_exif_fails() {
        assert_eq!(
            copy_exif(&bare_jpeg(), &bare_jpeg()),
            Err(ExifError::NotFound)
        );
    }

    #[test]
    fn copy_into_non_jpeg_fails() {
        assert_eq!(
            copy_exif(&sample_tiff(), b"\x89PNG"),
            Err(ExifError::NotJpeg)
        );
    }
}
