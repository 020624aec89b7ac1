//! ASCII portable pixmap (P3) writer.

use std::io::{self, BufWriter, Write};

use crate::Framebuffer;

/// Write the framebuffer as a P3 pixmap.
///
/// Header `P3\n{width} {height}\n255\n`, then one `R G B\n` line per pixel in
/// row-major order. A row ends every `width` lines; there is no separator.
pub fn write_ppm<W: Write>(fb: &Framebuffer, out: &mut W) -> io::Result<()> {
    let mut out = BufWriter::new(out);

    write!(out, "P3\n{} {}\n255\n", fb.width(), fb.height())?;
    for row in fb.rows() {
        for px in row.chunks_exact(3) {
            writeln!(out, "{} {} {}", px[0], px[1], px[2])?;
        }
    }

    out.flush()
}
