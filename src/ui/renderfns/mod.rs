mod header;
mod utils;

pub use header::draw_header;
pub use utils::{approval_color, format_amount, truncate};
