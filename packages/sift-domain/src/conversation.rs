#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Assistant,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}
}

/// One prior exchange turn. The history is owned by the caller across
/// requests; the pipeline only ever borrows it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConversationTurn {
	pub role: Role,
	pub text: String,
}

/// Most recent `max_turns` turns, oldest evicted first.
pub fn bounded_tail(history: &[ConversationTurn], max_turns: usize) -> &[ConversationTurn] {
	let start = history.len().saturating_sub(max_turns);

	&history[start..]
}
