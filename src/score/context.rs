use crate::error::CoreError;
use crate::model::{Competition, Course, Participant, Team, Tee, Tour};
use crate::storage::Storage;

/// Everything one leaderboard computation reads, fetched up front so the
/// computation itself never touches the store.
#[derive(Debug, Clone)]
pub struct CompetitionContext {
    pub competition: Competition,
    pub course: Course,
    pub tees: Vec<Tee>,
    pub tour: Option<Tour>,
    pub participants: Vec<Participant>,
    pub teams: Vec<Team>,
}

impl CompetitionContext {
    #[must_use]
    pub fn tee(&self, tee_id: Option<i64>) -> Option<&Tee> {
        let tee_id = tee_id?;
        self.tees.iter().find(|t| t.tee_id == tee_id)
    }

    #[must_use]
    pub fn participant(&self, participant_id: i64) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.participant_id == participant_id)
    }
}

/// Load a competition with its course, tees, tour, participants and teams.
///
/// # Errors
/// Returns `NotFound` for an unknown competition (or a dangling course/tour
/// reference) and `Db` when the store fails.
pub async fn load_competition_context(
    storage: &dyn Storage,
    competition_id: i64,
) -> Result<CompetitionContext, CoreError> {
    let competition = storage.get_competition(competition_id).await?;
    let course = storage.get_course(competition.course_id).await?;
    let tees = storage.get_tees(competition.course_id).await?;
    let tour = match competition.tour_id {
        Some(tour_id) => Some(storage.get_tour(tour_id).await?),
        None => None,
    };
    let participants = storage.get_participants(competition_id).await?;
    let teams = storage.get_teams(competition_id).await?;
    Ok(CompetitionContext {
        competition,
        course,
        tees,
        tour,
        participants,
        teams,
    })
}
