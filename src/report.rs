use vectorize::VectorizeError;

pub fn report_error(err: &VectorizeError) {
    match err {
        VectorizeError::ToolUnavailable { tool, reason } => {
            eprintln!("{tool} is not available: {reason}");
            eprintln!();
            eprintln!("Please install potrace or point to it:");
            eprintln!("  - Debian/Ubuntu: apt install potrace");
            eprintln!("  - macOS: brew install potrace");
            eprintln!("  - Use --potrace <path>");
            eprintln!("  - Or set environment variable VECTORIZE_POTRACE to the binary path");
        }
        VectorizeError::UnreadableImage { path, source } => {
            eprintln!("Cannot read {}: {source}", path.display());
            eprintln!("Only PNG input is expected; check that the file exists and is a valid image.");
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
