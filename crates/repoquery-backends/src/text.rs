//! Paragraph splitting for package-tool output

/// Split tool output into paragraphs of non-empty lines.
///
/// Runs of blank lines separate paragraphs, which is how both `apt-cache
/// show` and the ports index delimit records. Lines containing only
/// whitespace are not separators; apt uses them as folded-field content.
pub(crate) fn paragraphs(output: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in output.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}
