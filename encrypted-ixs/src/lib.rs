use arcis_imports::*;

#[encrypted]
mod circuits {
    use arcis_imports::*;

    // Mirrors clash_rules::battle. Circuits cannot import the rules crate.
    const HEALTH_BONUS_DIVISOR: u32 = 10;
    const MONSTER_POWER_WEAK: u32 = 5;
    const MONSTER_POWER_STRONG: u32 = 15;

    /// Stats as submitted by the minting client.
    pub struct SoldierStats {
        attack: u32,
        health: u32,
        defense: u32,
    }

    /// Everything the cluster keeps about a soldier. Field order matches
    /// the ciphertext layout of the on-chain soldier account.
    pub struct SoldierState {
        attack: u32,
        health: u32,
        defense: u32,
        score: u32,
    }

    /// Re-encrypt client stats to the cluster and start the score at zero.
    /// The 100-point budget is a client-side rule and is not checked here.
    #[instruction]
    pub fn mint_soldier(stats_ctxt: Enc<Shared, SoldierStats>, mxe: Mxe) -> Enc<Mxe, SoldierState> {
        let stats = stats_ctxt.to_arcis();
        let state = SoldierState {
            attack: stats.attack,
            health: stats.health,
            defense: stats.defense,
            score: 0,
        };
        mxe.from_arcis(state)
    }

    /// Fight a monster of random strength and bank the reward.
    #[instruction]
    pub fn attack_monster(state_ctxt: Enc<Mxe, SoldierState>) -> Enc<Mxe, SoldierState> {
        let mut state = state_ctxt.to_arcis();
        let bonus = state.health / HEALTH_BONUS_DIVISOR;
        let monster_power = if ArcisRNG::bool() {
            MONSTER_POWER_STRONG
        } else {
            MONSTER_POWER_WEAK
        };
        let reward = bonus + monster_power;
        // saturate: the score never decreases
        state.score = if state.score > u32::MAX - reward {
            u32::MAX
        } else {
            state.score + reward
        };
        state_ctxt.owner.from_arcis(state)
    }

    /// Hand the three stats to the requester's ephemeral key.
    #[instruction]
    pub fn reveal_stats(state_ctxt: Enc<Mxe, SoldierState>, requester: Shared) -> Enc<Shared, SoldierStats> {
        let state = state_ctxt.to_arcis();
        let stats = SoldierStats {
            attack: state.attack,
            health: state.health,
            defense: state.defense,
        };
        requester.from_arcis(stats)
    }

    #[instruction]
    pub fn reveal_score(state_ctxt: Enc<Mxe, SoldierState>, requester: Shared) -> Enc<Shared, u32> {
        let state = state_ctxt.to_arcis();
        requester.from_arcis(state.score)
    }
}
