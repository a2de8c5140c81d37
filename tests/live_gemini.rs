//! Live smoke test against the real Gemini API.
//!
//! Run with: cargo test --features integ_test --test live_gemini

#[cfg(feature = "integ_test")]
mod tests {
    use voicenote::gemini::GeminiClient;

    #[tokio::test]
    async fn note_has_all_five_sections() {
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                eprintln!("Skipping test: GEMINI_API_KEY not set");
                return;
            }
        };

        let client = GeminiClient::new(
            api_key,
            "gemini-2.0-flash".to_string(),
            "gemini-2.0-flash".to_string(),
        );

        let note = client
            .make_note(
                "I want to move the blog to a static site generator this month. \
                 The current setup is slow to build and hosting costs too much. \
                 I should ask Paul to benchmark build times for the three candidates first.",
            )
            .await
            .expect("note generation failed");

        println!("Note:\n{note}");

        for header in [
            "Topics:",
            "Most important:",
            "Actions:",
            "Implicit context:",
            "Compliment:",
        ] {
            assert!(note.contains(header), "missing section {header}:\n{note}");
        }
    }
}
