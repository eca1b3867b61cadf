use crate::schema::user::Role;
use crate::types::form::auth::AccountSummary;
use crate::types::form::members::MemberSummary;
use crate::types::form::posts::list::PostSummary;

// Pure string building only, so the boards can be tested without a
// transport or a terminal.

fn role_label(role: Role) -> &'static str {
  match role {
    Role::Member => "member",
    Role::Admin => "admin",
  }
}

/// The public board, newest submissions first as the server sent them.
#[must_use]
pub fn posts_board(posts: &[PostSummary]) -> String {
  if posts.is_empty() {
    return "There are no approved posts yet.".to_string();
  }

  let mut out = String::new();
  for post in posts {
    out.push_str(&format!(
      "#{id} [{category}] {title}\n    by {author} (level {level}) on {date} \u{b7} {views} views\n",
      id = post.id,
      category = post.category,
      title = post.title,
      author = post.author_name,
      level = post.level,
      date = post.created_at.format("%Y-%m-%d %H:%M"),
      views = post.views,
    ));
  }
  out
}

/// The member board, ranked as the server sent it.
#[must_use]
pub fn members_board(members: &[MemberSummary]) -> String {
  if members.is_empty() {
    return "Nobody has joined yet.".to_string();
  }

  let mut out = String::new();
  for (rank, member) in members.iter().enumerate() {
    out.push_str(&format!(
      "{rank:>3}. {name} \u{b7} level {level} \u{b7} {points} points \u{b7} {role}, joined {date}\n",
      rank = rank + 1,
      name = member.username,
      level = member.level,
      points = member.points,
      role = role_label(member.role),
      date = member.created_at.format("%Y-%m-%d"),
    ));
  }
  out
}

/// Confirmation line after a successful sign-in.
#[must_use]
pub fn signed_in(user: &AccountSummary) -> String {
  format!(
    "Signed in as {name} (level {level}, {points} points)",
    name = user.username,
    level = user.level,
    points = user.points,
  )
}
