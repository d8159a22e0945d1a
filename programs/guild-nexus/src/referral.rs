use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_REFERRAL_DEPTH, RANK_COUNT},
    errors::NexusError,
    state::{AccountHandler, TierConfig, TierTransition},
};

/// Number of descendants per classification rank (index 0 is rank 1).
///
/// Only the two walks in this module change the counters, so every update
/// goes through an attach or a tier change.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierCounts {
    counts: [u32; RANK_COUNT],
}

impl TierCounts {
    pub fn as_array(&self) -> [u32; RANK_COUNT] {
        self.counts
    }

    /// True when every rank holds at least the required number of descendants.
    pub fn meets(&self, required: &[u32; RANK_COUNT]) -> bool {
        self.counts
            .iter()
            .zip(required.iter())
            .all(|(have, need)| have >= need)
    }

    fn credit(&mut self, rank: u8) -> Result<()> {
        let index = rank_index(rank)?;
        self.counts[index] = self.counts[index]
            .checked_add(1)
            .ok_or(NexusError::MathOverflow)?;
        Ok(())
    }

    fn debit(&mut self, rank: u8) -> Result<()> {
        let index = rank_index(rank)?;
        self.counts[index] = self.counts[index]
            .checked_sub(1)
            .ok_or(NexusError::TierCountUnderflow)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_array(counts: [u32; RANK_COUNT]) -> Self {
        Self { counts }
    }
}

fn rank_index(rank: u8) -> Result<usize> {
    let rank = rank as usize;
    require!(
        (1..=RANK_COUNT).contains(&rank),
        NexusError::InvalidRankBands
    );
    Ok(rank - 1)
}

/// An ancestor loaded for a walk, nearest generation first.
pub struct Ancestor<'a> {
    pub key: Pubkey,
    pub handler: &'a mut AccountHandler,
}

/// Read-only view of one referral edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    pub key: Pubkey,
    pub referred_by: Option<Pubkey>,
}

impl Link {
    pub fn of(key: Pubkey, handler: &AccountHandler) -> Self {
        Self {
            key,
            referred_by: handler.referred_by(),
        }
    }
}

fn links(chain: &[Ancestor]) -> Vec<Link> {
    chain
        .iter()
        .map(|ancestor| Link::of(ancestor.key, ancestor.handler))
        .collect()
}

/// Checks that `links` is exactly the ancestor chain starting at `start`,
/// cut at the depth cap.
///
/// A chain that stops while an ancestor inside the cap still exists is
/// rejected, otherwise a caller could leave ancestors out of an update.
pub fn verify_chain(start: Option<Pubkey>, links: &[Link]) -> Result<()> {
    require!(
        links.len() <= MAX_REFERRAL_DEPTH,
        NexusError::ReferralChainTooLong
    );

    let mut cursor = start;
    for link in links {
        let expected = cursor.ok_or(NexusError::BrokenReferralChain)?;
        require_keys_eq!(link.key, expected, NexusError::BrokenReferralChain);
        cursor = link.referred_by;
    }

    if links.len() < MAX_REFERRAL_DEPTH && cursor.is_some() {
        return err!(NexusError::MissingAncestor);
    }

    Ok(())
}

/// Links `account` under `referrer` and counts it in every ancestor up to the
/// depth cap. `chain` starts at the referrer.
pub fn attach(
    account_key: Pubkey,
    account: &mut AccountHandler,
    referrer: Pubkey,
    config: &TierConfig,
    chain: &mut [Ancestor],
) -> Result<()> {
    require!(account.referred_by().is_none(), NexusError::AlreadyLinked);
    require!(referrer != Pubkey::default(), NexusError::InvalidAddress);
    require_keys_neq!(referrer, account_key, NexusError::SelfReferral);

    verify_chain(Some(referrer), &links(chain))?;

    let rank = config.rank_of(account.tier())?;
    for ancestor in chain.iter_mut() {
        ancestor.handler.tier_counts_mut().credit(rank)?;
    }

    account.link_referrer(referrer)
}

/// Moves `account` from its old rank to its new rank in every ancestor up to
/// the depth cap. `chain` starts at `account.referred_by()`.
pub fn on_tier_changed(
    account: &AccountHandler,
    config: &TierConfig,
    transition: TierTransition,
    chain: &mut [Ancestor],
) -> Result<()> {
    verify_chain(account.referred_by(), &links(chain))?;

    let old_rank = config.rank_of(transition.from)?;
    let new_rank = config.rank_of(transition.to)?;
    if old_rank == new_rank {
        return Ok(());
    }

    for ancestor in chain.iter_mut() {
        let counts = ancestor.handler.tier_counts_mut();
        counts.debit(old_rank)?;
        counts.credit(new_rank)?;
    }

    Ok(())
}

/// Answers whether `candidate` sits exactly `depth` generations above `from`.
///
/// `links` holds the ancestors of `from` at generations 1..depth-1, nearest
/// first. Walking past the root is an error, a different account at that
/// depth is `Ok(false)`.
pub fn check_ancestor_at(
    depth: u8,
    candidate: Pubkey,
    from: &AccountHandler,
    links: &[Link],
) -> Result<bool> {
    require!(
        depth >= 1 && depth as usize <= MAX_REFERRAL_DEPTH,
        NexusError::InvalidDepth
    );
    require!(candidate != Pubkey::default(), NexusError::InvalidAddress);

    let mut cursor = from.referred_by();
    for generation in 1..depth as usize {
        let expected = cursor.ok_or(NexusError::ReferralChainExhausted)?;
        let link = links
            .get(generation - 1)
            .ok_or(NexusError::MissingAncestor)?;
        require_keys_eq!(link.key, expected, NexusError::BrokenReferralChain);
        cursor = link.referred_by;
    }

    let ancestor = cursor.ok_or(NexusError::ReferralChainExhausted)?;
    Ok(ancestor == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_nexus_error;
    use std::collections::HashMap;

    struct Forest {
        config: TierConfig,
        accounts: HashMap<Pubkey, AccountHandler>,
        order: Vec<Pubkey>,
    }

    impl Forest {
        fn new() -> Self {
            Self {
                config: TierConfig::reference(Pubkey::new_unique(), Pubkey::new_unique(), 255),
                accounts: HashMap::new(),
                order: Vec::new(),
            }
        }

        fn ancestor_keys(&self, start: Option<Pubkey>) -> Vec<Pubkey> {
            let mut keys = Vec::new();
            let mut cursor = start;
            while let Some(key) = cursor {
                if keys.len() == MAX_REFERRAL_DEPTH {
                    break;
                }
                keys.push(key);
                cursor = self.accounts[&key].referred_by();
            }
            keys
        }

        /// Takes the listed accounts out of the forest, runs `f` over them as a
        /// chain and puts them back.
        fn with_chain<T>(&mut self, keys: &[Pubkey], f: impl FnOnce(&mut [Ancestor]) -> T) -> T {
            let mut taken: Vec<(Pubkey, AccountHandler)> = keys
                .iter()
                .map(|key| (*key, self.accounts.remove(key).unwrap()))
                .collect();
            let result = {
                let mut chain: Vec<Ancestor> = taken
                    .iter_mut()
                    .map(|(key, handler)| Ancestor { key: *key, handler })
                    .collect();
                f(&mut chain)
            };
            for (key, handler) in taken {
                self.accounts.insert(key, handler);
            }
            result
        }

        fn create(&mut self, referrer: Option<Pubkey>) -> Pubkey {
            let key = Pubkey::new_unique();
            let id = self.order.len() as u64 + 1;
            let mut handler = AccountHandler::new(id, Pubkey::new_unique(), 254, 253);
            if let Some(referrer) = referrer {
                let keys = self.ancestor_keys(Some(referrer));
                let config = self.config.clone();
                self.with_chain(&keys, |chain| attach(key, &mut handler, referrer, &config, chain))
                    .unwrap();
            }
            self.accounts.insert(key, handler);
            self.order.push(key);
            key
        }

        fn set_tier(&mut self, key: Pubkey, tier: u8) {
            let config = self.config.clone();
            let mut handler = self.accounts.remove(&key).unwrap();
            let transition = handler.override_tier(&config, tier).unwrap();
            let keys = self.ancestor_keys(handler.referred_by());
            self.with_chain(&keys, |chain| on_tier_changed(&handler, &config, transition, chain))
                .unwrap();
            self.accounts.insert(key, handler);
        }

        fn counts(&self, key: Pubkey) -> [u32; RANK_COUNT] {
            self.accounts[&key].tier_counts().as_array()
        }

        /// Recounts every descendant within the depth cap from scratch.
        fn brute_force_counts(&self, key: Pubkey) -> [u32; RANK_COUNT] {
            let mut counts = [0u32; RANK_COUNT];
            for (other, handler) in &self.accounts {
                if *other == key {
                    continue;
                }
                if self.ancestor_keys(handler.referred_by()).contains(&key) {
                    let rank = self.config.rank_of(handler.tier()).unwrap();
                    counts[rank as usize - 1] += 1;
                }
            }
            counts
        }
    }

    /// Small deterministic generator so property runs are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }

        fn below(&mut self, bound: usize) -> usize {
            (self.next() % bound as u64) as usize
        }
    }

    #[test]
    fn test_attach_counts_every_ancestor_in_chain() {
        let mut forest = Forest::new();
        let x = forest.create(None);
        let y = forest.create(Some(x));
        let z = forest.create(Some(y));
        let w = forest.create(Some(z));

        assert_eq!(forest.counts(x), [3, 0, 0, 0, 0]);
        assert_eq!(forest.counts(y), [2, 0, 0, 0, 0]);
        assert_eq!(forest.counts(z), [1, 0, 0, 0, 0]);
        assert_eq!(forest.counts(w), [0, 0, 0, 0, 0]);
        assert_eq!(forest.accounts[&y].referred_by(), Some(x));
    }

    #[test]
    fn test_promotion_moves_rank_in_ancestors_only() {
        let mut forest = Forest::new();
        let x = forest.create(None);
        let y = forest.create(Some(x));
        let z = forest.create(Some(y));
        let w = forest.create(Some(z));

        forest.set_tier(z, 2);

        assert_eq!(forest.counts(x), [2, 1, 0, 0, 0]);
        assert_eq!(forest.counts(y), [1, 1, 0, 0, 0]);
        assert_eq!(forest.counts(z), [1, 0, 0, 0, 0]);
        assert_eq!(forest.counts(w), [0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_override_tier_updates_referrer_counts() {
        let mut forest = Forest::new();
        let first = forest.create(None);
        let second = forest.create(Some(first));
        let third = forest.create(Some(second));
        forest.create(Some(third));

        forest.set_tier(second, 3);

        assert_eq!(forest.accounts[&second].tier(), 3);
        assert_eq!(forest.counts(first), [2, 0, 1, 0, 0]);
    }

    #[test]
    fn test_ancestors_beyond_depth_cap_are_not_updated() {
        let mut forest = Forest::new();
        let mut keys = vec![forest.create(None)];
        for _ in 0..MAX_REFERRAL_DEPTH + 1 {
            let parent = *keys.last().unwrap();
            keys.push(forest.create(Some(parent)));
        }
        let root = keys[0];
        let deepest = *keys.last().unwrap();

        // root sits MAX_REFERRAL_DEPTH + 1 generations above the deepest account
        assert_eq!(forest.counts(root), [MAX_REFERRAL_DEPTH as u32, 0, 0, 0, 0]);

        forest.set_tier(deepest, 2);
        assert_eq!(forest.counts(root), [MAX_REFERRAL_DEPTH as u32, 0, 0, 0, 0]);
        assert_eq!(forest.counts(keys[1]), [MAX_REFERRAL_DEPTH as u32 - 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_attach_rejects_second_link() {
        let mut forest = Forest::new();
        let x = forest.create(None);
        let y = forest.create(Some(x));
        let other = forest.create(None);

        let config = forest.config.clone();
        let mut handler = forest.accounts[&y].clone();
        let result = forest.with_chain(&[other], |chain| attach(y, &mut handler, other, &config, chain));
        assert_nexus_error(result, NexusError::AlreadyLinked);
        assert_eq!(forest.counts(other), [0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_attach_rejects_self_and_default_referrer() {
        let config = TierConfig::reference(Pubkey::new_unique(), Pubkey::new_unique(), 255);
        let key = Pubkey::new_unique();
        let mut handler = AccountHandler::new(1, Pubkey::new_unique(), 1, 1);

        let result = attach(key, &mut handler, key, &config, &mut []);
        assert_nexus_error(result, NexusError::SelfReferral);

        let result = attach(key, &mut handler, Pubkey::default(), &config, &mut []);
        assert_nexus_error(result, NexusError::InvalidAddress);
        assert_eq!(handler.referred_by(), None);
    }

    #[test]
    fn test_attach_rejects_incomplete_chain() {
        let mut forest = Forest::new();
        let x = forest.create(None);
        let y = forest.create(Some(x));

        let config = forest.config.clone();
        let key = Pubkey::new_unique();
        let mut handler = AccountHandler::new(3, Pubkey::new_unique(), 1, 1);
        let result = forest.with_chain(&[y], |chain| attach(key, &mut handler, y, &config, chain));

        assert_nexus_error(result, NexusError::MissingAncestor);
        assert_eq!(handler.referred_by(), None);
        assert_eq!(forest.counts(y), [0, 0, 0, 0, 0]);
        assert_eq!(forest.counts(x), [1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_verify_chain_rejects_mismatched_and_extra_links() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();

        let ok = [Link { key: a, referred_by: Some(b) }, Link { key: b, referred_by: None }];
        assert!(verify_chain(Some(a), &ok).is_ok());

        let wrong = [Link { key: stranger, referred_by: None }];
        assert_nexus_error(verify_chain(Some(a), &wrong), NexusError::BrokenReferralChain);

        let extra = [Link { key: a, referred_by: None }, Link { key: stranger, referred_by: None }];
        assert_nexus_error(verify_chain(Some(a), &extra), NexusError::BrokenReferralChain);

        assert!(verify_chain(None, &[]).is_ok());
    }

    #[test]
    fn test_verify_chain_rejects_chain_longer_than_cap() {
        let keys: Vec<Pubkey> = (0..=MAX_REFERRAL_DEPTH).map(|_| Pubkey::new_unique()).collect();
        let links: Vec<Link> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| Link { key: *key, referred_by: keys.get(i + 1).copied() })
            .collect();

        assert_nexus_error(verify_chain(Some(keys[0]), &links), NexusError::ReferralChainTooLong);
        assert!(verify_chain(Some(keys[0]), &links[..MAX_REFERRAL_DEPTH]).is_ok());
    }

    #[test]
    fn test_check_ancestor_at_depth_asymmetry() {
        let mut forest = Forest::new();
        let first = forest.create(None);
        let second = forest.create(Some(first));
        let third = forest.create(Some(second));
        let fourth = forest.create(Some(third));

        let from = forest.accounts[&fourth].clone();
        let links: Vec<Link> = [third, second, first]
            .iter()
            .map(|key| Link::of(*key, &forest.accounts[key]))
            .collect();

        assert!(check_ancestor_at(1, third, &from, &links).unwrap());
        assert!(check_ancestor_at(2, second, &from, &links).unwrap());
        assert!(check_ancestor_at(3, first, &from, &links).unwrap());

        // a different account at a reachable depth is a plain negative
        assert!(!check_ancestor_at(2, first, &from, &links).unwrap());

        // past the root is a hard failure
        assert_nexus_error(
            check_ancestor_at(4, first, &from, &links),
            NexusError::ReferralChainExhausted,
        );

        assert_nexus_error(check_ancestor_at(0, first, &from, &links), NexusError::InvalidDepth);
        assert_nexus_error(
            check_ancestor_at(MAX_REFERRAL_DEPTH as u8 + 1, first, &from, &links),
            NexusError::InvalidDepth,
        );
        assert_nexus_error(check_ancestor_at(1, Pubkey::default(), &from, &links), NexusError::InvalidAddress);
    }

    #[test]
    fn test_check_ancestor_at_reaches_depth_cap() {
        let mut forest = Forest::new();
        let mut keys = vec![forest.create(None)];
        for _ in 0..MAX_REFERRAL_DEPTH {
            let parent = *keys.last().unwrap();
            keys.push(forest.create(Some(parent)));
        }
        let deepest = *keys.last().unwrap();
        let from = forest.accounts[&deepest].clone();
        let links: Vec<Link> = keys[1..MAX_REFERRAL_DEPTH]
            .iter()
            .rev()
            .map(|key| Link::of(*key, &forest.accounts[key]))
            .collect();

        let depth = MAX_REFERRAL_DEPTH as u8;
        assert!(check_ancestor_at(depth, keys[0], &from, &links).unwrap());
        assert!(!check_ancestor_at(depth, keys[1], &from, &links).unwrap());
        assert_nexus_error(
            check_ancestor_at(depth + 1, keys[0], &from, &links),
            NexusError::InvalidDepth,
        );
    }

    #[test]
    fn test_check_ancestor_at_root_account() {
        let mut forest = Forest::new();
        let root = forest.create(None);
        let from = forest.accounts[&root].clone();

        assert_nexus_error(
            check_ancestor_at(1, Pubkey::new_unique(), &from, &[]),
            NexusError::ReferralChainExhausted,
        );
    }

    #[test]
    fn test_check_ancestor_at_rejects_substituted_link() {
        let mut forest = Forest::new();
        let first = forest.create(None);
        let second = forest.create(Some(first));
        let third = forest.create(Some(second));
        let decoy = forest.create(None);

        let from = forest.accounts[&third].clone();
        let links = [Link::of(decoy, &forest.accounts[&decoy])];
        assert_nexus_error(check_ancestor_at(2, first, &from, &links), NexusError::BrokenReferralChain);
    }

    #[test]
    fn test_random_operations_match_brute_force_recount() {
        let mut forest = Forest::new();
        let mut rng = Lcg(0x5eed);
        let mut history: HashMap<Pubkey, Vec<u8>> = HashMap::new();

        for _ in 0..4 {
            let key = forest.create(None);
            history.insert(key, vec![1]);
        }

        for _ in 0..300 {
            if rng.below(3) == 0 {
                let key = forest.order[rng.below(forest.order.len())];
                let tier = forest.accounts[&key].tier();
                if tier < forest.config.max_tier() {
                    let bump = 1 + rng.below((forest.config.max_tier() - tier) as usize) as u8;
                    forest.set_tier(key, tier + bump);
                    history.get_mut(&key).unwrap().push(tier + bump);
                }
            } else {
                let parent = if rng.below(5) == 0 {
                    None
                } else {
                    Some(forest.order[rng.below(forest.order.len())])
                };
                let key = forest.create(parent);
                history.insert(key, vec![1]);
            }
        }

        for key in &forest.order {
            // aggregate correctness
            assert_eq!(forest.counts(*key), forest.brute_force_counts(*key));

            // forest: the referrer walk never revisits an account and ends
            let mut seen = vec![*key];
            let mut cursor = forest.accounts[key].referred_by();
            while let Some(next) = cursor {
                assert!(!seen.contains(&next));
                seen.push(next);
                assert!(seen.len() <= forest.order.len());
                cursor = forest.accounts[&next].referred_by();
            }

            // monotone tier
            let tiers = &history[key];
            assert!(tiers.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(*tiers.last().unwrap(), forest.accounts[key].tier());
        }
    }
}
