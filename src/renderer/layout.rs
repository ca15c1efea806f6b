/// 固定模板的几何布局
///
/// 所有字面量与 1280×720 画布绑定：播放器面板 800×450 居中，封面内嵌
/// 200×200，文字/进度条/控制按钮均以封面位置为基准偏移。这里不做任何
/// 自适应排版，视觉还原本身就是组件的全部目的。
///
/// 坐标统一用 i32：画布小于面板时允许出现负坐标（与原模板行为一致）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbLayout {
    pub canvas_w: u32,
    pub canvas_h: u32,

    /// 面板（半透明深灰圆角矩形）
    pub panel_x: i32,
    pub panel_y: i32,
    pub panel_w: i32,
    pub panel_h: i32,
    pub panel_radius: i32,

    /// 封面内嵌（圆角裁剪的原始封面）
    pub art_x: i32,
    pub art_y: i32,
    pub art_size: i32,
    pub art_radius: i32,

    /// 文字起点（封面右缘 + 40）
    pub text_start_x: i32,

    /// 进度条
    pub bar_x_start: i32,
    pub bar_x_end: i32,
    pub bar_y: i32,
    pub bar_height: i32,
    pub bar_radius: i32,
    pub progress_width: i32,

    /// 控制按钮中心
    pub controls_cx: i32,
    pub controls_cy: i32,
}

/// 面板尺寸
const PANEL_W: i32 = 800;
const PANEL_H: i32 = 450;
const PANEL_RADIUS: i32 = 40;

/// 封面内嵌
const ART_SIZE: i32 = 200;
const ART_RADIUS: i32 = 20;

/// 进度条静态填充比例（纯装饰，不反映播放进度）
const PROGRESS_FRACTION: f32 = 0.4;

/// 字号：标题 / 艺人名 / 时间标签
pub const TITLE_FONT_SIZE: i32 = 45;
pub const ARTIST_FONT_SIZE: i32 = 30;
pub const TIME_FONT_SIZE: i32 = 25;

/// 标题最大字符数，超出则截断加省略号
pub const TITLE_MAX_CHARS: usize = 25;

/// 艺人名为占位字面量，不来自歌曲元数据
pub const ARTIST_LABEL: &str = "Gulzaar Chhaniwala";

impl ThumbLayout {
    /// 按画布尺寸计算整套布局
    pub fn new(canvas_w: u32, canvas_h: u32) -> Self {
        let w = canvas_w as i32;
        let h = canvas_h as i32;

        let panel_x = (w - PANEL_W) / 2;
        let panel_y = (h - PANEL_H) / 2;

        let art_x = panel_x + 40;
        let art_y = panel_y + (PANEL_H - ART_SIZE) / 2 - 40;

        let text_start_x = art_x + ART_SIZE + 40;

        let bar_x_start = text_start_x;
        let bar_x_end = panel_x + PANEL_W - 60;
        let bar_y = art_y + 150;
        let progress_width = ((bar_x_end - bar_x_start) as f32 * PROGRESS_FRACTION) as i32;

        Self {
            canvas_w,
            canvas_h,
            panel_x,
            panel_y,
            panel_w: PANEL_W,
            panel_h: PANEL_H,
            panel_radius: PANEL_RADIUS,
            art_x,
            art_y,
            art_size: ART_SIZE,
            art_radius: ART_RADIUS,
            text_start_x,
            bar_x_start,
            bar_x_end,
            bar_y,
            bar_height: 8,
            bar_radius: 4,
            progress_width,
            controls_cx: panel_x + PANEL_W / 2 + 100,
            controls_cy: panel_y + PANEL_H - 100,
        }
    }

    /// 标题顶边 y（封面顶 + 20）
    pub fn title_top_y(&self) -> i32 {
        self.art_y + 20
    }

    /// 艺人名顶边 y（封面顶 + 80）
    pub fn artist_top_y(&self) -> i32 {
        self.art_y + 80
    }

    /// 时间标签顶边 y（进度条下方 20）
    pub fn time_top_y(&self) -> i32 {
        self.bar_y + 20
    }

    /// 右侧时间标签 x（进度条末端左移 60）
    pub fn duration_label_x(&self) -> i32 {
        self.bar_x_end - 60
    }

    /// 播放三角形顶点
    pub fn play_triangle(&self) -> [(i32, i32); 3] {
        let (cx, cy) = (self.controls_cx, self.controls_cy);
        [(cx - 10, cy - 30), (cx + 30, cy), (cx - 10, cy + 30)]
    }

    /// 快退双三角（指向左）
    pub fn rewind_triangles(&self) -> [[(i32, i32); 3]; 2] {
        let (cx, cy) = (self.controls_cx, self.controls_cy);
        [
            [(cx - 80, cy), (cx - 50, cy - 20), (cx - 50, cy + 20)],
            [(cx - 110, cy), (cx - 80, cy - 20), (cx - 80, cy + 20)],
        ]
    }

    /// 快进双三角（指向右）
    pub fn fast_forward_triangles(&self) -> [[(i32, i32); 3]; 2] {
        let (cx, cy) = (self.controls_cx, self.controls_cy);
        [
            [(cx + 60, cy - 20), (cx + 90, cy), (cx + 60, cy + 20)],
            [(cx + 90, cy - 20), (cx + 120, cy), (cx + 90, cy + 20)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::ThumbLayout;

    #[test]
    fn panel_centered_on_default_canvas() {
        let l = ThumbLayout::new(1280, 720);
        assert_eq!((l.panel_x, l.panel_y), (240, 135));
        assert_eq!((l.panel_w, l.panel_h), (800, 450));
        assert_eq!(l.panel_radius, 40);
    }

    #[test]
    fn art_inset_anchored_to_panel() {
        let l = ThumbLayout::new(1280, 720);
        // 面板左 + 40，垂直居中再上移 40
        assert_eq!((l.art_x, l.art_y), (280, 220));
        assert_eq!(l.art_size, 200);
        assert_eq!(l.art_radius, 20);
    }

    #[test]
    fn text_and_bar_offsets_follow_art_position() {
        let l = ThumbLayout::new(1280, 720);
        assert_eq!(l.text_start_x, 520);
        assert_eq!(l.title_top_y(), 240);
        assert_eq!(l.artist_top_y(), 300);
        assert_eq!(l.bar_x_start, 520);
        assert_eq!(l.bar_x_end, 980);
        assert_eq!(l.bar_y, 370);
        assert_eq!(l.time_top_y(), 390);
        assert_eq!(l.duration_label_x(), 920);
    }

    #[test]
    fn progress_fill_is_static_forty_percent() {
        let l = ThumbLayout::new(1280, 720);
        assert_eq!(l.progress_width, 184);
    }

    #[test]
    fn transport_controls_centered_below_panel_middle() {
        let l = ThumbLayout::new(1280, 720);
        assert_eq!((l.controls_cx, l.controls_cy), (740, 485));
        assert_eq!(l.play_triangle(), [(730, 455), (770, 485), (730, 515)]);
        let rw = l.rewind_triangles();
        assert_eq!(rw[0], [(660, 485), (690, 465), (690, 505)]);
        assert_eq!(rw[1], [(630, 485), (660, 465), (660, 505)]);
        let ff = l.fast_forward_triangles();
        assert_eq!(ff[0], [(800, 465), (830, 485), (800, 505)]);
        assert_eq!(ff[1], [(830, 465), (860, 485), (830, 505)]);
    }
}
