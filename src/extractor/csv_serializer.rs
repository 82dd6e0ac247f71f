/// Joins extracted MIDs into the CSV body: one column, newline-separated,
/// no header row and no trailing newline. No quoting is applied; matched
/// content is digit/space only and can never contain the separator.
pub fn serialize(matches: &[String]) -> String {
    matches.join("\n")
}
