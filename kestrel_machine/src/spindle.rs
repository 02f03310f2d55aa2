//! Spindle backends and active spindle selection.

use heapless::Vec;
use tracing::{info, warn};

use kestrel_common::consts::MAX_SPINDLES;
use kestrel_common::error::Fault;

/// One spindle (PWM, relay, laser, ...).
pub trait Spindle: Send {
    fn name(&self) -> &str;

    /// Tool number this spindle answers to.
    fn tool(&self) -> u32;

    fn init(&mut self) -> Result<(), Fault>;

    /// Stop rotation / output.
    fn stop(&mut self);

    /// Release the spindle before another one is selected.
    fn deinit(&mut self) {
        self.stop();
    }
}

/// Configured spindles in selection order.
pub type SpindleList = Vec<Box<dyn Spindle>, MAX_SPINDLES>;

/// Make `index` the active spindle.
///
/// An out-of-range index falls back to spindle 0. A different previously
/// active spindle is deinitialized first. With an empty list `active` is
/// left `None`.
pub fn switch_spindle(
    index: usize,
    list: &mut SpindleList,
    active: &mut Option<usize>,
) -> Result<(), Fault> {
    if list.is_empty() {
        *active = None;
        return Ok(());
    }

    let target = if index < list.len() {
        index
    } else {
        warn!(index, available = list.len(), "Spindle index out of range, using 0");
        0
    };

    match *active {
        Some(prev) if prev == target => return Ok(()),
        Some(prev) => {
            if let Some(old) = list.get_mut(prev) {
                old.deinit();
            }
        }
        None => {}
    }

    let selected = &list[target];
    info!(spindle = selected.name(), tool = selected.tool(), "Spindle selected");
    *active = Some(target);
    Ok(())
}
