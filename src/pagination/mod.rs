use serde::Serialize;

/// Pages shown on each side of the current page.
pub const WINDOW_RADIUS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PageControl {
    Previous(u32),
    Page { number: u32, active: bool },
    Gap,
    Next(u32),
}

impl PageControl {
    /// The page this control navigates to, if any.
    pub fn target(&self) -> Option<u32> {
        match *self {
            PageControl::Previous(page) | PageControl::Next(page) => Some(page),
            PageControl::Page { number, .. } => Some(number),
            PageControl::Gap => None,
        }
    }
}

fn page(number: u32, current: u32) -> PageControl {
    PageControl::Page {
        number,
        active: number == current,
    }
}

/// Controls for a sliding window around `current`, with the first and last
/// pages pinned and gaps marked. A single page yields no controls at all.
pub fn page_controls(current: u32, total_pages: u32) -> Vec<PageControl> {
    if total_pages <= 1 {
        return vec![];
    }
    let current = current.clamp(1, total_pages);

    let start = current.saturating_sub(WINDOW_RADIUS).max(1);
    let end = current.saturating_add(WINDOW_RADIUS).min(total_pages);

    let mut controls = Vec::new();

    if current > 1 {
        controls.push(PageControl::Previous(current - 1));
    }

    if start > 1 {
        controls.push(page(1, current));
        if start > 2 {
            controls.push(PageControl::Gap);
        }
    }

    controls.extend((start..=end).map(|n| page(n, current)));

    if end < total_pages {
        if end < total_pages - 1 {
            controls.push(PageControl::Gap);
        }
        controls.push(page(total_pages, current));
    }

    if current < total_pages {
        controls.push(PageControl::Next(current + 1));
    }

    controls
}
