/// Split a comma-separated CLI argument, dropping blanks.
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_skips_blanks() {
        assert_eq!(split_csv(" smoke, ,cold-war-full ,"), vec!["smoke", "cold-war-full"]);
        assert!(split_csv("").is_empty());
    }
}
