use crate::extraction::protocol::strip_patch_for_display;

/// Two-character bold marker removed from every displayed reply.
pub const EMPHASIS_TOKEN: &str = "**";

/// Removes every `**` from `text`, verbatim.
///
/// Deliberately blunt: no markup parsing and no escaping, so a literal `**`
/// the author meant to keep is removed too. Existing transcripts depend on
/// exactly this output.
pub fn strip_emphasis(text: &str) -> String {
    text.replace(EMPHASIS_TOKEN, "")
}

/// Text for the human-facing chat bubble: emphasis and data blocks removed.
///
/// Dropping `**` can join the halves of a sentinel, so emphasis goes first and
/// both passes repeat until the text is stable.
pub fn display_text(raw_reply: &str) -> String {
    let mut text = raw_reply.to_string();
    loop {
        let next = strip_patch_for_display(&strip_emphasis(&text));
        if next == text {
            return next;
        }
        text = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emphasis_around_word() {
        assert_eq!(strip_emphasis("**Impact**"), "Impact");
    }

    #[test]
    fn test_strip_emphasis_is_blunt() {
        assert_eq!(strip_emphasis("2 ** 8 = 256"), "2  8 = 256");
        assert_eq!(strip_emphasis("***bold italic***"), "*bold italic*");
        assert_eq!(strip_emphasis("****"), "");
    }

    #[test]
    fn test_strip_emphasis_leaves_single_asterisks() {
        assert_eq!(strip_emphasis("*italic* stays"), "*italic* stays");
    }

    #[test]
    fn test_strip_emphasis_is_idempotent() {
        for sample in ["**a**", "*****", "x***y", "plain"] {
            let once = strip_emphasis(sample);
            assert_eq!(strip_emphasis(&once), once);
        }
    }

    #[test]
    fn test_display_text_combines_both_passes() {
        let raw = "**Great**, noted!\n<!--RESUME_DATA\n{\"summary\":\"**Lead** engineer\"}\nRESUME_DATA-->";
        assert_eq!(display_text(raw), "Great, noted!");
    }

    #[test]
    fn test_display_text_hides_block_split_by_emphasis() {
        let raw = "Hi <!--RESUME_**DATA {\"a\":1} RESUME_DATA-->";
        assert_eq!(display_text(raw), "Hi");

        let raw = "Done **<!--RESUME_DATA {} RESUME_DATA-->**";
        assert_eq!(display_text(raw), "Done");
    }
}
