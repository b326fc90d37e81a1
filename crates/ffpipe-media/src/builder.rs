//! Serializes an [`ArgumentContainer`] into FFmpeg command-line tokens.
//!
//! Token layout:
//!
//! ```text
//! [input options: hwaccel, decoder, loop, rate, start index] [input source] [output options] [output]
//! ```
//!
//! Within each group arguments follow [`ArgumentKind`] order. When a vendor
//! hardware encoder is present the software-only `Threads` and `Speed`
//! arguments are dropped.

use crate::argument::{Argument, ArgumentKind, Placement};
use crate::container::ArgumentContainer;
use crate::error::{MediaError, MediaResult};

/// Build the token sequence for one invocation.
///
/// Fails with [`MediaError::MissingArgument`] when the container lacks an
/// input source (`Input` or `Concat`) or an `Output`.
pub fn build_args(container: &ArgumentContainer) -> MediaResult<Vec<String>> {
    if !container.contains(ArgumentKind::Input) && !container.contains(ArgumentKind::Concat) {
        return Err(MediaError::MissingArgument(ArgumentKind::Input));
    }
    if !container.contains(ArgumentKind::Output) {
        return Err(MediaError::MissingArgument(ArgumentKind::Output));
    }

    let suppress_software_flags = container.has_vendor_encoder();

    let mut ordered: Vec<&Argument> = container
        .iter()
        .filter(|arg| !(suppress_software_flags && arg.kind().is_software_only()))
        .collect();
    ordered.sort_by_key(|arg| arg.order_key());

    Ok(ordered.into_iter().flat_map(Argument::render).collect())
}

/// Space-joined command line for logging.
pub fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
