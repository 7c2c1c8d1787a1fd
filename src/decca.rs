use bevy_reflect::Reflect;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    nav::{NavAid, NavAidType},
    tokens::{tokenise, to_upper, FieldError},
    ErrorPolicy,
};

/// Position of the channel designator within a master's name, e.g. "DECCA MASTER 7B CHERBOURG".
const CHANNEL_TOKEN: usize = 2;

#[derive(Error, Debug, PartialEq)]
pub enum DeccaError {
    #[error("{navaid_type} {ident} appears before any Decca master")]
    OrphanChainMember {
        ident: String,
        navaid_type: NavAidType,
    },
    #[error("malformed Decca master name: {0}")]
    Field(#[from] FieldError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize)]
pub enum DeccaRole {
    Master,
    Red,
    Green,
    Purple,
}

impl DeccaRole {
    pub fn parse(role: &str) -> Option<Self> {
        match to_upper(role).as_str() {
            "MASTER" => Some(Self::Master),
            "RED" => Some(Self::Red),
            "GREEN" => Some(Self::Green),
            "PURPLE" => Some(Self::Purple),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DeccaChain {
    pub channel: String,
    pub name: String,
    pub master: NavAid,
    pub red: Option<NavAid>,
    pub green: Option<NavAid>,
    pub purple: Option<NavAid>,
}

impl DeccaChain {
    pub fn open(master: &NavAid) -> Result<Self, FieldError> {
        let name_tokens = tokenise(&master.name);

        Ok(Self {
            channel: name_tokens.field(CHANNEL_TOKEN)?.to_string(),
            name: name_tokens.detokenise(CHANNEL_TOKEN + 1),
            master: master.clone(),
            red: None,
            green: None,
            purple: None,
        })
    }

    fn slave_mut(&mut self, role: DeccaRole) -> Option<&mut Option<NavAid>> {
        match role {
            DeccaRole::Master => None,
            DeccaRole::Red => Some(&mut self.red),
            DeccaRole::Green => Some(&mut self.green),
            DeccaRole::Purple => Some(&mut self.purple),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &NavAid> {
        [Some(&self.master), self.red.as_ref(), self.green.as_ref(), self.purple.as_ref()]
            .into_iter()
            .flatten()
    }
}

fn add_to_chains(
    chains: &mut Vec<DeccaChain>,
    open_chain: &mut Option<usize>,
    navaid: &NavAid,
) -> Result<(), DeccaError> {
    match navaid.navaid_type.decca_role() {
        Some(DeccaRole::Master) => {
            *open_chain = None;
            chains.push(DeccaChain::open(navaid)?);
            *open_chain = Some(chains.len() - 1);
        }
        Some(role) => {
            let chain = open_chain
                .and_then(|idx| chains.get_mut(idx))
                .ok_or_else(|| DeccaError::OrphanChainMember {
                    ident: navaid.ident.clone(),
                    navaid_type: navaid.navaid_type,
                })?;
            let channel = chain.channel.clone();
            if let Some(slot) = chain.slave_mut(role) {
                if let Some(previous) = slot.replace(navaid.clone()) {
                    trace!("{role:?} {} replaces {} in chain {channel}", navaid.ident, previous.ident);
                } else {
                    trace!("{role:?} {} joins chain {channel}", navaid.ident);
                }
            }
        }
        None => (),
    }

    Ok(())
}

/// Groups Decca masters with the colored stations following them, in source order.
pub fn build_decca_chains(
    navaids: &[NavAid],
    policy: ErrorPolicy,
) -> Result<Vec<DeccaChain>, DeccaError> {
    let mut chains = vec![];
    let mut open_chain = None;

    for navaid in navaids {
        if let Err(e) = add_to_chains(&mut chains, &mut open_chain, navaid) {
            match policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::SkipLine => warn!("skipping Decca station {}: {e}", navaid.ident),
            }
        }
    }

    debug!("built {} Decca chains", chains.len());
    Ok(chains)
}

#[cfg(test)]
mod test {
    use pretty_assertions_sorted::assert_eq_sorted;

    use crate::{
        nav::{NavAid, NavAidType},
        tokens::FieldError,
        ErrorPolicy,
    };

    use super::{build_decca_chains, DeccaChain, DeccaError, DeccaRole};

    fn station(ident: &str, role: &str, rest: &str) -> NavAid {
        NavAid::parse(&format!("99 50.0 -1.0 0 0 0 0 {ident} DECCA {role} {rest}")).unwrap()
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(DeccaRole::parse("master"), Some(DeccaRole::Master));
        assert_eq!(DeccaRole::parse("Purple"), Some(DeccaRole::Purple));
        assert_eq!(DeccaRole::parse("7B"), None);
    }

    #[test]
    fn test_open_chain() {
        let master = station("LFG", "MASTER", "7B CHERBOURG CHAIN");

        assert_eq_sorted!(
            DeccaChain::open(&master),
            Ok(DeccaChain {
                channel: "7B".to_string(),
                name: "CHERBOURG CHAIN".to_string(),
                master: master.clone(),
                red: None,
                green: None,
                purple: None,
            })
        );
    }

    #[test]
    fn test_two_chains() {
        let master_a = station("AM", "MASTER", "7B ENGLISH");
        let red_a = station("AR", "RED", "7B");
        let green_a = station("AG", "GREEN", "7B");
        let master_b = station("BM", "MASTER", "3E FRISIAN ISLANDS");
        let purple_b = station("BP", "PURPLE", "3E");
        let vor = NavAid::parse("3 47.43 -122.31 354 11680 130 19.0 SEA SEATTLE").unwrap();

        let chains = build_decca_chains(
            &[
                master_a.clone(),
                red_a.clone(),
                vor,
                green_a.clone(),
                master_b.clone(),
                purple_b.clone(),
            ],
            ErrorPolicy::Abort,
        )
        .unwrap();

        assert_eq_sorted!(
            chains,
            vec![
                DeccaChain {
                    channel: "7B".to_string(),
                    name: "ENGLISH".to_string(),
                    master: master_a,
                    red: Some(red_a),
                    green: Some(green_a),
                    purple: None,
                },
                DeccaChain {
                    channel: "3E".to_string(),
                    name: "FRISIAN ISLANDS".to_string(),
                    master: master_b,
                    red: None,
                    green: None,
                    purple: Some(purple_b),
                },
            ]
        );
        assert_eq!(
            chains[1]
                .members()
                .map(|m| m.ident.as_str())
                .collect::<Vec<_>>(),
            vec!["BM", "BP"]
        );
    }

    #[test]
    fn test_orphan_member() {
        let navaids = [
            station("AR", "RED", "7B"),
            station("AM", "MASTER", "7B ENGLISH"),
        ];

        assert_eq!(
            build_decca_chains(&navaids, ErrorPolicy::Abort),
            Err(DeccaError::OrphanChainMember {
                ident: "AR".to_string(),
                navaid_type: NavAidType::DeccaRed,
            })
        );

        let chains = build_decca_chains(&navaids, ErrorPolicy::SkipLine).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].red, None);
    }

    #[test]
    fn test_malformed_master_name() {
        let master = station("AM", "MASTER", "");

        assert_eq!(
            build_decca_chains(&[master.clone()], ErrorPolicy::Abort),
            Err(DeccaError::Field(FieldError::InsufficientFields {
                expected: 3,
                actual: 2
            }))
        );

        // members of a master that failed to open have no chain to join
        let red = station("AR", "RED", "7B");
        assert_eq!(
            build_decca_chains(&[master, red], ErrorPolicy::SkipLine),
            Ok(vec![])
        );
    }

    #[test]
    fn test_non_decca_ignored() {
        let navaids = [
            NavAid::parse("2 38.08 -77.45 0 350 25 0.0 APH A P HILL NDB").unwrap(),
            NavAid::default(),
        ];

        assert_eq!(build_decca_chains(&navaids, ErrorPolicy::Abort), Ok(vec![]));
    }
}
