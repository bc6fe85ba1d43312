use bw_utils::EngravingSpec;

use crate::fonts::{FontRequest, TextMeasurer};
use crate::layout::{LineMetrics, layout_block};
use crate::{Canvas, GeneratedTexture, INK, SynthesisError, TEXTURE_SIZE, TextureOptions};

pub(crate) fn render_text(
    spec: &EngravingSpec,
    options: &TextureOptions,
    measurer: &dyn TextMeasurer,
) -> Result<GeneratedTexture, SynthesisError> {
    let font = FontRequest::from_spec(spec);
    let normalized = spec.text.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let metrics = lines
        .iter()
        .map(|line| measure_line(measurer, line, &font))
        .collect::<Result<Vec<_>, _>>()?;
    let layout = layout_block(
        &metrics,
        font.size,
        spec.alignment,
        spec.placement,
        TEXTURE_SIZE,
    );

    let scale = options.scale();
    let stroke = (font.size * 0.06).max(1.0);
    // Rasterize at the final drawn size so a shrunk block never needs a
    // surface larger than the texture itself.
    let shrink = if layout.box_width > 0.0 {
        (layout.draw_width / layout.box_width).min(1.0)
    } else {
        1.0
    };
    let mut block = Canvas::new(layout.box_width, layout.box_height, scale * shrink)?;
    for (line, placed) in lines.iter().zip(&layout.lines) {
        measurer.draw_line(line, &font, placed.start_x, placed.baseline, INK, &mut block)?;
        if spec.underline {
            let y = placed.underline_y() - stroke / 2.0;
            block.fill_rect(placed.start_x, y, placed.width, stroke, INK);
        }
        if spec.strikethrough {
            let y = placed.strikethrough_y() - stroke / 2.0;
            block.fill_rect(placed.start_x, y, placed.width, stroke, INK);
        }
    }

    let mut canvas = Canvas::new(TEXTURE_SIZE, TEXTURE_SIZE, scale)?;
    canvas.draw_image(
        block.pixels(),
        layout.x,
        layout.y,
        layout.draw_width,
        layout.draw_height,
        |p| p,
    );
    Ok(GeneratedTexture::new(canvas.into_image()))
}

fn measure_line(
    measurer: &dyn TextMeasurer,
    line: &str,
    font: &FontRequest,
) -> Result<LineMetrics, SynthesisError> {
    let probe = if line.is_empty() { " " } else { line };
    let measured = measurer.measure(probe, font)?;
    Ok(LineMetrics {
        width: measured.width,
        ascent: measured.ascent.unwrap_or(font.size * 0.75),
        descent: measured.descent.unwrap_or(font.size * 0.25),
    })
}
