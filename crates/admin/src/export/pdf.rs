//! Single-image A4 PDF writer.
//!
//! The rendered invoice arrives as one raster image. It is scaled to the
//! full A4 width (210 mm) with height `image_height * 210 / image_width`.
//! Images taller than one page continue on further pages, each page showing
//! the next 297 mm slice of the same image.
//!
//! JPEG is embedded as-is with `DCTDecode`. Greyscale, RGB and palette PNG
//! IDAT data is embedded as-is with `FlateDecode` and the PNG predictor.
//! PNGs with an alpha channel are decoded, and their colour and alpha
//! samples are recompressed separately, the alpha becoming a soft mask.
//! PNGs must be 8-bit and non-interlaced.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use thiserror::Error;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

const PT_PER_MM: f64 = 72.0 / 25.4;
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SOI: &[u8] = &[0xFF, 0xD8];

/// Slack for floating-point error when counting pages.
const PAGE_EPSILON_MM: f64 = 1e-6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdfError {
    #[error("unrecognised image format")]
    UnknownFormat,
    #[error("malformed {0} image")]
    Malformed(&'static str),
    #[error("unsupported PNG: {0}")]
    UnsupportedPng(String),
    #[error("image has zero width or height")]
    Empty,
}

/// Placement of one image on A4 pages, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub image_width_mm: f64,
    pub image_height_mm: f64,
    pub pages: usize,
}

impl PageLayout {
    /// Fit an image of `width` x `height` pixels to the A4 width.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Empty`] if either dimension is zero.
    pub fn a4_fit(width: u32, height: u32) -> Result<Self, PdfError> {
        if width == 0 || height == 0 {
            return Err(PdfError::Empty);
        }

        let image_height_mm = f64::from(height) * A4_WIDTH_MM / f64::from(width);
        let pages = (image_height_mm / A4_HEIGHT_MM - PAGE_EPSILON_MM)
            .ceil()
            .max(1.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pages = pages as usize;

        Ok(Self {
            image_width_mm: A4_WIDTH_MM,
            image_height_mm,
            pages,
        })
    }

    /// Vertical offset of the image's bottom edge on page `index`, measured
    /// up from the page's bottom edge. Later pages shift the image up by one
    /// page height each.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn image_offset_mm(&self, index: usize) -> f64 {
        A4_HEIGHT_MM - self.image_height_mm + index as f64 * A4_HEIGHT_MM
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Encoding {
    /// PNG IDAT stream with `colors` samples per pixel.
    Png { colors: u8 },
    /// PNG IDAT stream of palette indices; `palette` holds the RGB triples.
    Indexed { palette: Vec<u8> },
    /// Zlib-compressed unfiltered samples with `colors` samples per pixel.
    Flate { colors: u8 },
    /// Baseline or progressive JPEG with `components` channels.
    Jpeg { components: u8 },
}

/// An encoded raster image ready to embed.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    encoding: Encoding,
    data: Vec<u8>,
    /// Zlib-compressed 8-bit alpha samples, embedded as a soft mask.
    alpha: Option<Vec<u8>>,
}

impl RasterImage {
    /// Parse a PNG or JPEG by its signature.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the format is unknown, the data is truncated
    /// or the PNG variant cannot be embedded directly.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        if bytes.starts_with(PNG_SIGNATURE) {
            parse_png(bytes)
        } else if bytes.starts_with(JPEG_SOI) {
            parse_jpeg(bytes)
        } else {
            Err(PdfError::UnknownFormat)
        }
    }

    /// Whether the image carries a soft mask.
    #[must_use]
    pub const fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    fn dictionary(&self, smask: Option<usize>) -> String {
        let mut dictionary = match &self.encoding {
            Encoding::Png { colors } => format!(
                "/Type /XObject /Subtype /Image /Width {w} /Height {h} /ColorSpace {cs} \
                 /BitsPerComponent 8 /Filter /FlateDecode \
                 /DecodeParms << /Predictor 15 /Colors {colors} /BitsPerComponent 8 /Columns {w} >>",
                w = self.width,
                h = self.height,
                cs = color_space(*colors),
            ),
            Encoding::Indexed { palette } => format!(
                "/Type /XObject /Subtype /Image /Width {w} /Height {h} \
                 /ColorSpace [/Indexed /DeviceRGB {hival} <{hex}>] \
                 /BitsPerComponent 8 /Filter /FlateDecode \
                 /DecodeParms << /Predictor 15 /Colors 1 /BitsPerComponent 8 /Columns {w} >>",
                w = self.width,
                h = self.height,
                hival = palette.len() / 3 - 1,
                hex = palette.iter().map(|b| format!("{b:02X}")).collect::<String>(),
            ),
            Encoding::Flate { colors } => format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
                 /BitsPerComponent 8 /Filter /FlateDecode",
                self.width,
                self.height,
                color_space(*colors),
            ),
            Encoding::Jpeg { components } => format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} \
                 /BitsPerComponent 8 /Filter /DCTDecode",
                self.width,
                self.height,
                color_space(*components),
            ),
        };
        if let Some(id) = smask {
            dictionary.push_str(&format!(" /SMask {id} 0 R"));
        }
        dictionary
    }

    fn mask_dictionary(&self) -> String {
        format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray \
             /BitsPerComponent 8 /Filter /FlateDecode",
            self.width, self.height,
        )
    }
}

const fn color_space(channels: u8) -> &'static str {
    match channels {
        1 => "/DeviceGray",
        4 => "/DeviceCMYK",
        _ => "/DeviceRGB",
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_be_bytes([*b.first()?, *b.get(1)?]))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(b))
}

fn parse_png(bytes: &[u8]) -> Result<RasterImage, PdfError> {
    let malformed = || PdfError::Malformed("PNG");
    let mut header = None;
    let mut palette = None;
    let mut data = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    while pos < bytes.len() {
        let len = usize::try_from(be_u32(bytes, pos).ok_or_else(malformed)?)
            .map_err(|_| malformed())?;
        let kind = bytes.get(pos + 4..pos + 8).ok_or_else(malformed)?;
        let body = bytes.get(pos + 8..pos + 8 + len).ok_or_else(malformed)?;

        match kind {
            b"IHDR" => header = Some(body.to_vec()),
            b"PLTE" => palette = Some(body.to_vec()),
            b"IDAT" => data.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }
        // Length, type, body and CRC
        pos += 12 + len;
    }

    let header = header.ok_or_else(malformed)?;
    let width = be_u32(&header, 0).ok_or_else(malformed)?;
    let height = be_u32(&header, 4).ok_or_else(malformed)?;
    let bit_depth = *header.get(8).ok_or_else(malformed)?;
    let color_type = *header.get(9).ok_or_else(malformed)?;
    let interlace = *header.get(12).ok_or_else(malformed)?;

    if bit_depth != 8 {
        return Err(PdfError::UnsupportedPng(format!("bit depth {bit_depth}")));
    }
    if interlace != 0 {
        return Err(PdfError::UnsupportedPng("interlaced".to_owned()));
    }
    if data.is_empty() {
        return Err(malformed());
    }

    let image = |encoding, data, alpha| RasterImage {
        width,
        height,
        encoding,
        data,
        alpha,
    };

    match color_type {
        0 => Ok(image(Encoding::Png { colors: 1 }, data, None)),
        2 => Ok(image(Encoding::Png { colors: 3 }, data, None)),
        3 => {
            let palette = palette.ok_or_else(malformed)?;
            if palette.is_empty() || palette.len() % 3 != 0 || palette.len() > 256 * 3 {
                return Err(malformed());
            }
            Ok(image(Encoding::Indexed { palette }, data, None))
        }
        4 | 6 => {
            let colors = if color_type == 4 { 1 } else { 3 };
            let (color, alpha) = split_alpha(&data, width, height, colors)?;
            Ok(image(Encoding::Flate { colors }, color, Some(alpha)))
        }
        other => Err(PdfError::UnsupportedPng(format!("colour type {other}"))),
    }
}

/// Inflate and unfilter an 8-bit PNG with an alpha channel, then recompress
/// the colour and alpha samples as two separate zlib streams.
fn split_alpha(
    idat: &[u8],
    width: u32,
    height: u32,
    colors: u8,
) -> Result<(Vec<u8>, Vec<u8>), PdfError> {
    let malformed = || PdfError::Malformed("PNG");
    let colors = usize::from(colors);
    let bpp = colors + 1;
    let width = usize::try_from(width).map_err(|_| malformed())?;
    let height = usize::try_from(height).map_err(|_| malformed())?;

    let mut raw = Vec::new();
    ZlibDecoder::new(idat)
        .read_to_end(&mut raw)
        .map_err(|_| malformed())?;
    let pixels = unfilter(&raw, width.checked_mul(bpp).ok_or_else(malformed)?, height, bpp)?;

    let mut color = Vec::with_capacity(width * height * colors);
    let mut alpha = Vec::with_capacity(width * height);
    for pixel in pixels.chunks_exact(bpp) {
        let (a, rgb) = pixel.split_last().ok_or_else(malformed)?;
        color.extend_from_slice(rgb);
        alpha.push(*a);
    }

    Ok((deflate(&color)?, deflate(&alpha)?))
}

/// Undo PNG scanline filters. `stride` is the row length in bytes and `bpp`
/// the bytes per pixel.
fn unfilter(raw: &[u8], stride: usize, height: usize, bpp: usize) -> Result<Vec<u8>, PdfError> {
    let malformed = || PdfError::Malformed("PNG");
    let mut out = Vec::with_capacity(stride * height);
    let mut prev = vec![0_u8; stride];
    let mut rows = raw.chunks_exact(stride + 1);

    for _ in 0..height {
        let (&filter, line) = rows
            .next()
            .and_then(<[u8]>::split_first)
            .ok_or_else(malformed)?;
        let mut row = line.to_vec();

        for i in 0..stride {
            let left = i
                .checked_sub(bpp)
                .and_then(|j| row.get(j))
                .copied()
                .unwrap_or(0);
            let up = prev.get(i).copied().unwrap_or(0);
            let up_left = i
                .checked_sub(bpp)
                .and_then(|j| prev.get(j))
                .copied()
                .unwrap_or(0);
            let predicted = match filter {
                0 => 0,
                1 => left,
                2 => up,
                3 => u8::try_from((u16::from(left) + u16::from(up)) / 2).unwrap_or(u8::MAX),
                4 => paeth(left, up, up_left),
                _ => return Err(malformed()),
            };
            if let Some(byte) = row.get_mut(i) {
                *byte = byte.wrapping_add(predicted);
            }
        }

        out.extend_from_slice(&row);
        prev = row;
    }

    Ok(out)
}

fn paeth(left: u8, up: u8, up_left: u8) -> u8 {
    let (a, b, c) = (i16::from(left), i16::from(up), i16::from(up_left));
    let p = a + b - c;
    let (pa, pb, pc) = ((p - a).abs(), (p - b).abs(), (p - c).abs());
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        up
    } else {
        up_left
    }
}

fn deflate(samples: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(samples)
        .map_err(|_| PdfError::Malformed("PNG"))?;
    encoder.finish().map_err(|_| PdfError::Malformed("PNG"))
}

fn parse_jpeg(bytes: &[u8]) -> Result<RasterImage, PdfError> {
    let malformed = || PdfError::Malformed("JPEG");
    let mut pos = JPEG_SOI.len();

    loop {
        if *bytes.get(pos).ok_or_else(malformed)? != 0xFF {
            return Err(malformed());
        }
        let marker = *bytes.get(pos + 1).ok_or_else(malformed)?;
        match marker {
            // Fill byte
            0xFF => pos += 1,
            // Standalone markers
            0x01 | 0xD0..=0xD7 => pos += 2,
            // Start of frame (excluding DHT, JPG and DAC)
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let height = be_u16(bytes, pos + 5).ok_or_else(malformed)?;
                let width = be_u16(bytes, pos + 7).ok_or_else(malformed)?;
                let components = *bytes.get(pos + 9).ok_or_else(malformed)?;
                return Ok(RasterImage {
                    width: u32::from(width),
                    height: u32::from(height),
                    encoding: Encoding::Jpeg { components },
                    data: bytes.to_vec(),
                    alpha: None,
                });
            }
            // Start of scan or end of image before any frame header
            0xDA | 0xD9 => return Err(malformed()),
            _ => {
                let len = be_u16(bytes, pos + 2).ok_or_else(malformed)?;
                pos += 2 + usize::from(len);
            }
        }
    }
}

/// Minimal PDF object writer tracking byte offsets for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            buf: b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Id the next object will receive.
    const fn next_id(&self) -> usize {
        self.offsets.len() + 1
    }

    fn object(&mut self, body: &str) -> usize {
        let id = self.next_id();
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n<< {body} >>\nendobj\n").as_bytes());
        id
    }

    fn stream(&mut self, dictionary: &str, data: &[u8]) -> usize {
        let id = self.next_id();
        self.offsets.push(self.buf.len());
        self.buf.extend_from_slice(
            format!(
                "{id} 0 obj\n<< {dictionary} /Length {} >>\nstream\n",
                data.len()
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        id
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref_at = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

fn pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Build a PDF showing `image` at full A4 width across as many pages as its
/// scaled height needs.
///
/// # Errors
///
/// Returns [`PdfError::Empty`] for zero-sized images.
pub fn single_image_pdf(image: &RasterImage) -> Result<Vec<u8>, PdfError> {
    let layout = PageLayout::a4_fit(image.width, image.height)?;
    let mut pdf = PdfWriter::new();

    // Object ids are assigned in write order: catalog 1, page tree 2, the
    // soft mask if any, the image, then a page and its content stream per
    // page.
    let first_page = if image.has_alpha() { 5 } else { 4 };
    let kids: Vec<String> = (0..layout.pages)
        .map(|i| format!("{} 0 R", first_page + 2 * i))
        .collect();

    let root = pdf.object("/Type /Catalog /Pages 2 0 R");
    pdf.object(&format!(
        "/Type /Pages /Kids [{}] /Count {}",
        kids.join(" "),
        layout.pages
    ));
    let smask = image
        .alpha
        .as_ref()
        .map(|alpha| pdf.stream(&image.mask_dictionary(), alpha));
    let image_id = pdf.stream(&image.dictionary(smask), &image.data);

    let (page_w, page_h) = (pt(A4_WIDTH_MM), pt(A4_HEIGHT_MM));
    let (image_w, image_h) = (pt(layout.image_width_mm), pt(layout.image_height_mm));

    for index in 0..layout.pages {
        let page_id = pdf.next_id();
        pdf.object(&format!(
            "/Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
             /Resources << /XObject << /Im0 {image_id} 0 R >> >> /Contents {} 0 R",
            page_id + 1
        ));
        let content = format!(
            "q {image_w:.4} 0 0 {image_h:.4} 0 {:.4} cm /Im0 Do Q",
            pt(layout.image_offset_mm(index))
        );
        pdf.stream("", content.as_bytes());
    }

    Ok(pdf.finish(root))
}
