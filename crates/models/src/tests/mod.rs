
/// Pure helpers that need no database
mod slug_tests {
    use crate::service::slugify;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("Wedding  Catering & Decor"), "wedding-catering-decor");
    }

    #[test]
    fn slug_trims_edges() {
        assert_eq!(slugify("  --Birthday Party!! "), "birthday-party");
        assert_eq!(slugify("???"), "");
    }
}
