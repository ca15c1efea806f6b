use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use resvg::usvg::{self, Options as UsvgOptions, fontdb};
use resvg::{
    render,
    tiny_skia::{Pixmap, Transform},
};

use crate::config::FontsConfig;
use crate::error::ThumbError;

use super::layout::{
    ARTIST_FONT_SIZE, ARTIST_LABEL, TIME_FONT_SIZE, TITLE_FONT_SIZE, TITLE_MAX_CHARS, ThumbLayout,
};

/// 左侧时间标签固定显示起点
const TIME_LABEL_START: &str = "00:00";

/// 构造期一次性载入字体库，之后所有渲染共享只读句柄。
///
/// 先载入系统字体兜底，再叠加配置目录下的 ttf/otf。
pub fn load_font_db(fonts_dir: &Path) -> Arc<fontdb::Database> {
    let mut font_db = fontdb::Database::new();
    font_db.load_system_fonts();

    if fonts_dir.exists() {
        match fs::read_dir(fonts_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file()
                        && (path.extension() == Some("ttf".as_ref())
                            || path.extension() == Some("otf".as_ref()))
                        && let Err(e) = font_db.load_font_file(&path)
                    {
                        tracing::error!("加载字体文件失败 '{}': {}", path.display(), e);
                    }
                }
            }
            Err(e) => {
                tracing::error!("读取字体目录失败 '{}': {}", fonts_dir.display(), e);
            }
        }
    } else {
        tracing::warn!("字体目录不存在: {}", fonts_dir.display());
    }

    Arc::new(font_db)
}

/// 标题超长截断：超过 25 字符取前 25 个加省略号（按字符而非字节）。
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_MAX_CHARS {
        let head: String = title.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn polygon_points(vertices: &[(i32, i32)]) -> String {
    let mut s = String::new();
    for (i, (x, y)) in vertices.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{x},{y}");
    }
    s
}

/// 生成完整缩略图 SVG：背景与封面以 Data URI 内嵌，其余全部为矢量与文字。
///
/// 绘制顺序即层序：背景 → 面板 → 圆角裁剪的封面 → 文字 → 进度条 → 控制按钮。
pub fn compose_svg(
    layout: &ThumbLayout,
    fonts: &FontsConfig,
    title: &str,
    duration: &str,
    background_uri: &str,
    art_uri: &str,
) -> Result<String, ThumbError> {
    let fmt_err = |e| ThumbError::Render(format!("SVG formatting error: {e}"));

    let l = layout;
    let (w, h) = (l.canvas_w, l.canvas_h);
    let bold_family = escape_xml(&fonts.bold_family);
    let light_family = escape_xml(&fonts.light_family);

    let mut svg = String::with_capacity(8 * 1024 + background_uri.len() + art_uri.len());
    writeln!(
        svg,
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#
    )
    .map_err(fmt_err)?;

    // 封面圆角裁剪：resvg 以该几何生成 alpha 遮罩
    writeln!(
        svg,
        r#"<defs><clipPath id="art-clip"><rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" /></clipPath></defs>"#,
        l.art_x, l.art_y, l.art_size, l.art_size, l.art_radius, l.art_radius
    )
    .map_err(fmt_err)?;

    // 背景层（已模糊压暗的拉伸封面）
    writeln!(
        svg,
        r#"<image href="{background_uri}" x="0" y="0" width="{w}" height="{h}" />"#
    )
    .map_err(fmt_err)?;

    // 播放器面板：半透明深灰圆角矩形（alpha 220/255）
    writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" fill="rgb(50,50,50)" fill-opacity="{:.3}" />"#,
        l.panel_x,
        l.panel_y,
        l.panel_w,
        l.panel_h,
        l.panel_radius,
        l.panel_radius,
        220.0 / 255.0
    )
    .map_err(fmt_err)?;

    // 封面内嵌（原始清晰封面，圆角裁剪）
    writeln!(
        svg,
        r#"<image href="{art_uri}" x="{}" y="{}" width="{}" height="{}" clip-path="url(#art-clip)" />"#,
        l.art_x, l.art_y, l.art_size, l.art_size
    )
    .map_err(fmt_err)?;

    // 标题与艺人名。原模板以文字顶边定位，SVG 用基线，故 y 下移一个字号。
    let title_escaped = escape_xml(&truncate_title(title));
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-family="{bold_family}" font-weight="bold" font-size="{TITLE_FONT_SIZE}" fill="white">{title_escaped}</text>"#,
        l.text_start_x,
        l.title_top_y() + TITLE_FONT_SIZE
    )
    .map_err(fmt_err)?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-family="{light_family}" font-weight="300" font-size="{ARTIST_FONT_SIZE}" fill="rgb(200,200,200)">{}</text>"#,
        l.text_start_x,
        l.artist_top_y() + ARTIST_FONT_SIZE,
        escape_xml(ARTIST_LABEL)
    )
    .map_err(fmt_err)?;

    // 进度条：浅灰轨道 + 静态 40% 白色填充
    writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" fill="rgb(100,100,100)" />"#,
        l.bar_x_start,
        l.bar_y,
        l.bar_x_end - l.bar_x_start,
        l.bar_height,
        l.bar_radius,
        l.bar_radius
    )
    .map_err(fmt_err)?;
    writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" fill="white" />"#,
        l.bar_x_start, l.bar_y, l.progress_width, l.bar_height, l.bar_radius, l.bar_radius
    )
    .map_err(fmt_err)?;

    // 时间标签：左侧固定 00:00，右侧为调用方预格式化的时长
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-family="{light_family}" font-weight="300" font-size="{TIME_FONT_SIZE}" fill="white">{TIME_LABEL_START}</text>"#,
        l.bar_x_start,
        l.time_top_y() + TIME_FONT_SIZE
    )
    .map_err(fmt_err)?;
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-family="{light_family}" font-weight="300" font-size="{TIME_FONT_SIZE}" fill="white">{}</text>"#,
        l.duration_label_x(),
        l.time_top_y() + TIME_FONT_SIZE,
        escape_xml(duration)
    )
    .map_err(fmt_err)?;

    // 控制按钮：快退双箭头、播放三角、快进双箭头，纯装饰矢量
    for tri in l.rewind_triangles() {
        writeln!(
            svg,
            r#"<polygon points="{}" fill="white" />"#,
            polygon_points(&tri)
        )
        .map_err(fmt_err)?;
    }
    writeln!(
        svg,
        r#"<polygon points="{}" fill="white" />"#,
        polygon_points(&l.play_triangle())
    )
    .map_err(fmt_err)?;
    for tri in l.fast_forward_triangles() {
        writeln!(
            svg,
            r#"<polygon points="{}" fill="white" />"#,
            polygon_points(&tri)
        )
        .map_err(fmt_err)?;
    }

    writeln!(svg, "</svg>").map_err(fmt_err)?;
    Ok(svg)
}

/// 将 SVG 栅格化并编码为 PNG 字节。
pub fn rasterize_to_png(
    svg_data: &str,
    font_db: Arc<fontdb::Database>,
    default_family: &str,
    optimize_speed: bool,
) -> Result<Vec<u8>, ThumbError> {
    // 分段计时，定位瓶颈
    let t0 = std::time::Instant::now();

    let opts = UsvgOptions {
        fontdb: font_db,
        font_family: default_family.to_string(),
        font_size: 16.0,
        languages: vec!["en".to_string()],
        shape_rendering: if optimize_speed {
            usvg::ShapeRendering::OptimizeSpeed
        } else {
            usvg::ShapeRendering::GeometricPrecision
        },
        text_rendering: if optimize_speed {
            usvg::TextRendering::OptimizeSpeed
        } else {
            usvg::TextRendering::OptimizeLegibility
        },
        image_rendering: if optimize_speed {
            usvg::ImageRendering::OptimizeSpeed
        } else {
            usvg::ImageRendering::OptimizeQuality
        },
        ..Default::default()
    };

    let tree = usvg::Tree::from_data(svg_data.as_bytes(), &opts)
        .map_err(|e| ThumbError::Render(format!("Failed to parse SVG: {e}")))?;
    let t_parse = t0.elapsed();

    let pixmap_size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(pixmap_size.width(), pixmap_size.height())
        .ok_or_else(|| ThumbError::Render("Failed to create pixmap".to_string()))?;

    render(&tree, Transform::default(), &mut pixmap.as_mut());
    let t_raster = t0.elapsed();

    // 使用 png crate 进行快速编码
    let mut out = Vec::with_capacity((pixmap_size.width() * pixmap_size.height() * 4) as usize);
    {
        let mut encoder = png::Encoder::new(&mut out, pixmap_size.width(), pixmap_size.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        if optimize_speed {
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
        } else {
            encoder.set_compression(png::Compression::Default);
            encoder.set_filter(png::FilterType::Paeth);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| ThumbError::Render(format!("PNG write_header error: {e}")))?;
        writer
            .write_image_data(pixmap.data())
            .map_err(|e| ThumbError::Render(format!("PNG write_image_data error: {e}")))?;
        writer
            .finish()
            .map_err(|e| ThumbError::Render(format!("PNG finish error: {e}")))?;
    }
    let t_encode = t0.elapsed();

    tracing::debug!(
        "PNG渲染内部分段: 解析={:?}, 栅格化={:?}, 编码={:?}, 总计={:?}",
        t_parse,
        t_raster - t_parse,
        t_encode - t_raster,
        t_encode
    );

    Ok(out)
}
