//! Repository layer: idempotent writes per entity kind, each in a
//! standalone and a batched form.

pub mod account;
pub mod account_block;
pub mod balance;
pub mod batch;
pub mod bridge;
pub mod fusion;
pub mod momentum;
pub mod pillar;
pub mod pillar_update;
pub mod project;
pub mod project_phase;
pub mod reward;
pub mod sentinel;
pub mod stake;
pub mod token;
pub mod vote;

pub use account::AccountRepository;
pub use account_block::AccountBlockRepository;
pub use balance::BalanceRepository;
pub use batch::Batch;
pub use bridge::BridgeRepository;
pub use fusion::FusionRepository;
pub use momentum::MomentumRepository;
pub use pillar::PillarRepository;
pub use pillar_update::PillarUpdateRepository;
pub use project::ProjectRepository;
pub use project_phase::ProjectPhaseRepository;
pub use reward::RewardRepository;
pub use sentinel::SentinelRepository;
pub use stake::StakeRepository;
pub use token::TokenRepository;
pub use vote::VoteRepository;

use sqlx::PgPool;

/// All repositories over one shared pool.
#[derive(Clone)]
pub struct Repositories {
    pub momentum: MomentumRepository,
    pub account: AccountRepository,
    pub account_block: AccountBlockRepository,
    pub balance: BalanceRepository,
    pub token: TokenRepository,
    pub pillar: PillarRepository,
    pub pillar_update: PillarUpdateRepository,
    pub sentinel: SentinelRepository,
    pub stake: StakeRepository,
    pub fusion: FusionRepository,
    pub project: ProjectRepository,
    pub project_phase: ProjectPhaseRepository,
    pub vote: VoteRepository,
    pub reward: RewardRepository,
    pub bridge: BridgeRepository,
}

impl Repositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            momentum: MomentumRepository::new(pool.clone()),
            account: AccountRepository::new(pool.clone()),
            account_block: AccountBlockRepository::new(pool.clone()),
            balance: BalanceRepository::new(pool.clone()),
            token: TokenRepository::new(pool.clone()),
            pillar: PillarRepository::new(pool.clone()),
            pillar_update: PillarUpdateRepository::new(pool.clone()),
            sentinel: SentinelRepository::new(pool.clone()),
            stake: StakeRepository::new(pool.clone()),
            fusion: FusionRepository::new(pool.clone()),
            project: ProjectRepository::new(pool.clone()),
            project_phase: ProjectPhaseRepository::new(pool.clone()),
            vote: VoteRepository::new(pool.clone()),
            reward: RewardRepository::new(pool.clone()),
            bridge: BridgeRepository::new(pool),
        }
    }
}
