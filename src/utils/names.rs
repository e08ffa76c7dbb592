/// Split a raw names list on newlines and commas, trimming blanks away.
pub fn parse_names(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove the first occurrence of `name`, re-joining the rest one per line.
/// Returns `None` when the name is not in the list.
pub fn remove_name(text: &str, name: &str) -> Option<String> {
    let mut names = parse_names(text);
    let index = names.iter().position(|n| n == name)?;
    names.remove(index);
    Some(names.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newlines_and_commas() {
        assert_eq!(
            parse_names("Ann, Bob\n\n  Cleo  ,,\r\nDan"),
            vec!["Ann", "Bob", "Cleo", "Dan"]
        );
        assert!(parse_names(" , \n ").is_empty());
    }

    #[test]
    fn removes_only_first_occurrence() {
        assert_eq!(remove_name("Ann, Bob, Ann", "Ann").as_deref(), Some("Bob\nAnn"));
        assert_eq!(remove_name("Ann", "Zed"), None);
    }
}
