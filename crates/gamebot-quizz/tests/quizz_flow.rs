//! End-to-end tests for the quiz game driven through a session actor.
//!
//! Every test spins up a real session actor with a recording
//! `MockMessenger` and feeds it platform events, the same way the
//! directory does in production.

use std::sync::Arc;
use std::time::Duration;

use gamebot_platform::mock::{Action, DIRECT_CHANNEL_BASE, MockMessenger};
use gamebot_platform::{
    ChannelId, GuildId, MessageEvent, MessageId, ReactionEvent, UserId,
};
use gamebot_quizz::QuizzGame;
use gamebot_session::{SessionHandle, SessionId, SessionState, spawn_session};

const BOT: UserId = UserId(999);
const HOST: UserId = UserId(10);
const PLAYER_A: UserId = UserId(11);
const PLAYER_B: UserId = UserId(12);
const GUILD: GuildId = GuildId(1);
const LOBBY: ChannelId = ChannelId(100);
const ANSWER_1: ChannelId = ChannelId(101);
const ANSWER_2: ChannelId = ChannelId(102);

/// The first message the mock vends is the lobby prompt.
const LOBBY_MESSAGE: MessageId = MessageId(1001);

/// Lets the session actor and any timer tasks drain their queues.
async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

async fn start_session() -> (Arc<MockMessenger>, SessionHandle) {
    let messenger = Arc::new(MockMessenger::new(BOT));
    messenger.set_category(GUILD, "questions", vec![LOBBY, ANSWER_1, ANSWER_2]);
    let handle = spawn_session(
        SessionId(1),
        GUILD,
        Arc::clone(&messenger),
        QuizzGame::new(),
    );
    handle.start(LOBBY, HOST).await.expect("session starts");
    (messenger, handle)
}

fn lobby_reaction(user: UserId) -> ReactionEvent {
    ReactionEvent {
        user,
        guild: Some(GUILD),
        channel: LOBBY,
        message: LOBBY_MESSAGE,
        emoji: "\u{2705}".to_string(),
    }
}

fn direct(author: UserId, message: u64, content: &str) -> MessageEvent {
    MessageEvent {
        author: Some(author),
        guild: None,
        channel: ChannelId(DIRECT_CHANNEL_BASE + author.0),
        message: MessageId(message),
        content: content.to_string(),
    }
}

/// Joins the given players and fires the host's go signal.
async fn launch_with(handle: &SessionHandle, players: &[UserId]) {
    for player in players {
        handle.reaction(lobby_reaction(*player)).await.unwrap();
    }
    handle.reaction(lobby_reaction(HOST)).await.unwrap();
    settle().await;
}

/// The most recently posted embed message (the current round's tracked
/// question message).
fn round_message(messenger: &MockMessenger) -> MessageId {
    messenger
        .actions()
        .into_iter()
        .rev()
        .find_map(|a| match a {
            Action::EmbedSent { message, .. } => Some(message),
            _ => None,
        })
        .expect("a round message was posted")
}

#[tokio::test]
async fn test_lobby_posts_prompt_with_join_reaction() {
    let (messenger, handle) = start_session().await;

    let texts = messenger.texts_sent_to(LOBBY);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("React to this message to join"));
    assert!(messenger.actions().iter().any(|a| matches!(
        a,
        Action::ReactionAdded { message, .. } if *message == LOBBY_MESSAGE
    )));

    let info = handle.info().await.unwrap();
    assert_eq!(info.state, SessionState::Starting);
    assert!(info.players.contains(&HOST));
}

#[tokio::test]
async fn test_host_go_signal_with_no_players_ends_session() {
    let (messenger, handle) = start_session().await;

    handle.reaction(lobby_reaction(HOST)).await.unwrap();
    settle().await;

    let info = handle.info().await.unwrap();
    assert_eq!(info.state, SessionState::Inactive);
    assert!(info.ended_at.is_some());
    let edited = messenger.actions().into_iter().any(|a| matches!(
        a,
        Action::MessageEdited { message, content, .. }
            if message == LOBBY_MESSAGE && content.contains("not enough players")
    ));
    assert!(edited);
    assert!(messenger.reactions_cleared(LOBBY_MESSAGE));
}

#[tokio::test]
async fn test_launch_announces_players_and_notifies_channels() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    let info = handle.info().await.unwrap();
    assert_eq!(info.state, SessionState::Active);
    assert!(info.players.contains(&PLAYER_A));
    assert!(info.players.contains(&PLAYER_B));

    // Lobby message edited to announce both players by mention.
    let announced = messenger.actions().into_iter().any(|a| matches!(
        a,
        Action::MessageEdited { message, content, .. }
            if message == LOBBY_MESSAGE
                && content.contains("<@11>")
                && content.contains("<@12>")
    ));
    assert!(announced);
    assert!(messenger.reactions_cleared(LOBBY_MESSAGE));

    // Host got private instructions; both answer channels got the notice.
    let host_dm = ChannelId(DIRECT_CHANNEL_BASE + HOST.0);
    assert!(!messenger.texts_sent_to(host_dm).is_empty());
    assert_eq!(messenger.texts_sent_to(ANSWER_1).len(), 1);
    assert_eq!(messenger.texts_sent_to(ANSWER_2).len(), 1);
}

#[tokio::test]
async fn test_late_join_reaction_is_ignored_once_active() {
    let (_messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle.reaction(lobby_reaction(UserId(77))).await.unwrap();
    settle().await;

    let info = handle.info().await.unwrap();
    assert!(!info.players.contains(&UserId(77)));
}

#[tokio::test]
async fn test_full_round_scenario_ranks_and_reveals() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    handle
        .direct_message(direct(HOST, 500, "Capital of France?"))
        .await
        .unwrap();
    settle().await;

    let round_msg = round_message(&messenger);
    let embed = messenger.last_embed(round_msg).unwrap();
    assert_eq!(embed.title, "Capital of France?");
    assert_eq!(embed.description, None);
    assert_eq!(embed.fields[0].value, "*Waiting for answers...*");

    // The host's question message was acknowledged with a reaction, and
    // the question was relayed to both answer channels.
    let host_dm = ChannelId(DIRECT_CHANNEL_BASE + HOST.0);
    assert!(messenger.actions().iter().any(|a| matches!(
        a,
        Action::ReactionAdded { channel, message, .. }
            if *channel == host_dm && *message == MessageId(500)
    )));
    assert!(
        messenger
            .texts_sent_to(ANSWER_1)
            .iter()
            .any(|t| t.contains("Capital of France?"))
    );

    handle
        .direct_message(direct(PLAYER_A, 600, "Paris"))
        .await
        .unwrap();
    settle().await;
    handle
        .direct_message(direct(PLAYER_B, 601, "Paris"))
        .await
        .unwrap();
    settle().await;

    // Each player was told their rank as a reply to their own message.
    let replies = messenger.replies();
    let reply_a = replies
        .iter()
        .find(|(_, r, _)| *r == MessageId(600))
        .expect("player A got a reply");
    assert!(reply_a.2.starts_with("You are 1st ("));
    let reply_b = replies
        .iter()
        .find(|(_, r, _)| *r == MessageId(601))
        .expect("player B got a reply");
    assert!(reply_b.2.starts_with("You are 2nd ("));

    // Both actual players answered, so the round auto-stopped and the
    // tracked message reveals the answers in arrival order.
    let revealed = messenger.last_embed(round_msg).unwrap();
    let body = &revealed.fields[0].value;
    assert!(body.starts_with("1) <@11> ("));
    assert!(body.contains("): Paris"));
    assert!(body.contains("2) <@12> ("));
    assert!(!body.ends_with("..."));
    assert!(messenger.reactions_cleared(round_msg));
}

#[tokio::test]
async fn test_multiline_question_becomes_title_and_description() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle
        .direct_message(direct(HOST, 500, "Title line\nMore\ndetail"))
        .await
        .unwrap();
    settle().await;

    let embed = messenger.last_embed(round_message(&messenger)).unwrap();
    assert_eq!(embed.title, "Title line");
    assert_eq!(embed.description.as_deref(), Some("More\ndetail"));
    assert!(
        messenger
            .texts_sent_to(ANSWER_1)
            .iter()
            .any(|t| t.contains("> **Title line**\nMore\ndetail"))
    );
}

#[tokio::test]
async fn test_duplicate_answer_is_silently_dropped() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;
    let round_msg = round_message(&messenger);

    handle
        .direct_message(direct(PLAYER_A, 600, "first try"))
        .await
        .unwrap();
    settle().await;
    let edits_after_first = messenger.embed_edit_count(round_msg);
    assert_eq!(messenger.replies().len(), 1);

    handle
        .direct_message(direct(PLAYER_A, 601, "second try"))
        .await
        .unwrap();
    settle().await;

    // No new reply, no new recorded answer, no message update.
    assert_eq!(messenger.replies().len(), 1);
    assert_eq!(messenger.embed_edit_count(round_msg), edits_after_first);
    let body = messenger.last_embed(round_msg).unwrap().fields[0].value.clone();
    assert!(!body.contains("2)"));
}

#[tokio::test]
async fn test_guild_mention_answers_count_too() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;
    let round_msg = round_message(&messenger);

    // A guild message mentioning the bot is an answer submission.
    handle
        .guild_message(MessageEvent {
            author: Some(PLAYER_A),
            guild: Some(GUILD),
            channel: ANSWER_1,
            message: MessageId(700),
            content: "<@999> forty-two".to_string(),
        })
        .await
        .unwrap();
    settle().await;

    let replies = messenger.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, ANSWER_1);
    assert!(replies[0].2.starts_with("You are 1st ("));

    // Sole actual player answered: round auto-stopped and revealed.
    let body = messenger.last_embed(round_msg).unwrap().fields[0].value.clone();
    assert!(body.contains("): forty-two"));
}

#[tokio::test]
async fn test_guild_message_without_mention_is_ignored() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;

    handle
        .guild_message(MessageEvent {
            author: Some(PLAYER_A),
            guild: Some(GUILD),
            channel: ANSWER_1,
            message: MessageId(700),
            content: "just chatting".to_string(),
        })
        .await
        .unwrap();
    settle().await;

    assert!(messenger.replies().is_empty());
}

#[tokio::test]
async fn test_host_reaction_on_round_message_stops_it_idempotently() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;
    let round_msg = round_message(&messenger);

    let stop_reaction = ReactionEvent {
        user: HOST,
        guild: Some(GUILD),
        channel: LOBBY,
        message: round_msg,
        emoji: "\u{1F4BE}".to_string(),
    };
    handle.reaction(stop_reaction.clone()).await.unwrap();
    settle().await;

    let body = messenger.last_embed(round_msg).unwrap().fields[0].value.clone();
    assert_eq!(body, "*No answers.*");
    assert!(messenger.reactions_cleared(round_msg));
    let edits = messenger.embed_edit_count(round_msg);

    // Reacting again must not produce a second reveal edit.
    handle.reaction(stop_reaction).await.unwrap();
    settle().await;
    assert_eq!(messenger.embed_edit_count(round_msg), edits);

    // A non-host reaction on a round message does nothing either.
    handle
        .reaction(ReactionEvent {
            user: PLAYER_A,
            guild: Some(GUILD),
            channel: LOBBY,
            message: round_msg,
            emoji: "\u{1F4BE}".to_string(),
        })
        .await
        .unwrap();
    settle().await;
    assert_eq!(messenger.embed_edit_count(round_msg), edits);
}

#[tokio::test(start_paused = true)]
async fn test_round_stops_on_timeout_with_no_answers() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;
    let round_msg = round_message(&messenger);
    assert!(!messenger.reactions_cleared(round_msg));

    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    let body = messenger.last_embed(round_msg).unwrap().fields[0].value.clone();
    assert_eq!(body, "*No answers.*");
    assert!(messenger.reactions_cleared(round_msg));

    // Late answers bounce off the stopped round: no reply is sent.
    handle
        .direct_message(direct(PLAYER_A, 600, "too late"))
        .await
        .unwrap();
    settle().await;
    assert!(messenger.replies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_after_manual_stop_is_a_no_op() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle
        .direct_message(direct(HOST, 500, "Question?"))
        .await
        .unwrap();
    settle().await;
    let round_msg = round_message(&messenger);

    // The only actual player answers: the round auto-stops early.
    handle
        .direct_message(direct(PLAYER_A, 600, "Paris"))
        .await
        .unwrap();
    settle().await;
    let edits = messenger.embed_edit_count(round_msg);
    assert!(messenger.reactions_cleared(round_msg));

    // The 60 s timer still fires later and must change nothing.
    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;
    assert_eq!(messenger.embed_edit_count(round_msg), edits);
}

#[tokio::test]
async fn test_new_question_closes_out_running_round() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A, PLAYER_B]).await;

    handle
        .direct_message(direct(HOST, 500, "First?"))
        .await
        .unwrap();
    settle().await;
    let first_msg = round_message(&messenger);

    handle
        .direct_message(direct(HOST, 501, "Second?"))
        .await
        .unwrap();
    settle().await;
    let second_msg = round_message(&messenger);
    assert_ne!(first_msg, second_msg);

    // The first round was revealed and closed before the second opened.
    assert!(messenger.reactions_cleared(first_msg));
    assert!(!messenger.reactions_cleared(second_msg));

    // Answers land on the latest round only.
    handle
        .direct_message(direct(PLAYER_A, 600, "answer"))
        .await
        .unwrap();
    settle().await;
    let body = messenger.last_embed(second_msg).unwrap().fields[0].value.clone();
    assert!(body.starts_with("1) <@11> ("));
}

#[tokio::test]
async fn test_host_stop_ends_the_session() {
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &[PLAYER_A]).await;

    handle
        .direct_message(direct(HOST, 500, "stop"))
        .await
        .unwrap();
    settle().await;

    let info = handle.info().await.unwrap();
    assert_eq!(info.state, SessionState::Inactive);
    assert!(info.ended_at.is_some());
    assert!(
        messenger
            .texts_sent_to(LOBBY)
            .iter()
            .any(|t| t.contains("The quiz is over"))
    );

    // Further submissions are ignored without a reply.
    handle
        .direct_message(direct(PLAYER_A, 600, "anyone there?"))
        .await
        .unwrap();
    settle().await;
    assert!(messenger.replies().is_empty());
}

#[tokio::test]
async fn test_concurrent_answers_get_contiguous_unique_ranks() {
    let players: Vec<UserId> = (11..16).map(UserId).collect();
    let (messenger, handle) = start_session().await;
    launch_with(&handle, &players).await;

    handle
        .direct_message(direct(HOST, 500, "Race!"))
        .await
        .unwrap();
    settle().await;

    // All five answers delivered concurrently; the session actor
    // serializes them, so every player gets exactly one distinct rank.
    let mut tasks = Vec::new();
    for (i, player) in players.iter().enumerate() {
        let handle = handle.clone();
        let player = *player;
        let message = 600 + i as u64;
        tasks.push(tokio::spawn(async move {
            handle
                .direct_message(direct(player, message, "go"))
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    settle().await;

    let replies = messenger.replies();
    assert_eq!(replies.len(), 5);
    for ordinal in ["1st", "2nd", "3rd", "4th", "5th"] {
        let count = replies
            .iter()
            .filter(|(_, _, text)| text.contains(&format!("You are {ordinal} (")))
            .count();
        assert_eq!(count, 1, "exactly one player ranked {ordinal}");
    }

    // Everyone answered, so the round auto-stopped.
    let round_msg = round_message(&messenger);
    assert!(messenger.reactions_cleared(round_msg));
}
