// SPDX-License-Identifier: MIT OR Apache-2.0

//! Links between defendants, their defence clients and the case they are charged on.
use counsel_core::command::{LinkDefendant, RecordOffences};
use counsel_core::{
    CaseId, DefenceClientId, DefendantId, Event, InputError, LinkEvent, Offence, reason,
};

use crate::aggregate::{Aggregate, apply_all};

/// Case and defence client of a defendant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseLink {
    pub case_id: CaseId,
    pub defence_client_id: DefenceClientId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkState {
    link: Option<CaseLink>,
    offences: Vec<Offence>,
}

impl LinkState {
    pub fn resolve(&self) -> Option<CaseLink> {
        self.link
    }

    pub fn offences(&self) -> &[Offence] {
        &self.offences
    }
}

impl Aggregate for LinkState {
    type Event = LinkEvent;

    fn extract(event: &Event) -> Option<&Self::Event> {
        event.as_link()
    }

    fn apply(mut y: Self, event: &Self::Event) -> Self {
        match event {
            LinkEvent::DefendantLinkedToCase {
                defence_client_id,
                case_id,
                offences,
                ..
            } => {
                y.link = Some(CaseLink {
                    case_id: *case_id,
                    defence_client_id: *defence_client_id,
                });
                y.offences = offences.clone();
            }
            LinkEvent::OffencesUpdated { offences, .. } => {
                y.offences = offences.clone();
            }
            LinkEvent::DefendantLinkRejected { .. }
            | LinkEvent::DefenceClientRegistered { .. } => (),
        }

        y
    }
}

/// Link a defendant to a case, the link is written once.
pub fn link_defendant(y: LinkState, command: &LinkDefendant) -> (LinkState, Vec<LinkEvent>) {
    match y.resolve() {
        Some(link)
            if link.case_id == command.case_id
                && link.defence_client_id == command.defence_client_id =>
        {
            (y, vec![])
        }
        Some(_) => {
            let events = vec![LinkEvent::DefendantLinkRejected {
                defendant_id: command.defendant_id,
                defence_client_id: command.defence_client_id,
                case_id: command.case_id,
                reason: reason::DEFENDANT_ALREADY_LINKED.to_string(),
            }];
            (y, events)
        }
        None => {
            let events = vec![LinkEvent::DefendantLinkedToCase {
                defendant_id: command.defendant_id,
                defence_client_id: command.defence_client_id,
                case_id: command.case_id,
                offences: command.offences.clone(),
            }];
            (apply_all(y, &events), events)
        }
    }
}

/// Replace the offences of a linked defendant.
pub fn record_offences(
    y: LinkState,
    command: &RecordOffences,
) -> Result<(LinkState, Vec<LinkEvent>), InputError> {
    if y.link.is_none() {
        return Err(InputError::UnknownDefendant(command.defendant_id));
    }

    let events = vec![LinkEvent::OffencesUpdated {
        defendant_id: command.defendant_id,
        offences: command.offences.clone(),
    }];
    Ok((apply_all(y, &events), events))
}

/// Reverse lookup from a defence client to its defendant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefenceClientState {
    defendant_id: Option<DefendantId>,
}

impl DefenceClientState {
    pub fn defendant_for(&self) -> Option<DefendantId> {
        self.defendant_id
    }
}

impl Aggregate for DefenceClientState {
    type Event = LinkEvent;

    fn extract(event: &Event) -> Option<&Self::Event> {
        event.as_link()
    }

    fn apply(mut y: Self, event: &Self::Event) -> Self {
        if let LinkEvent::DefenceClientRegistered { defendant_id, .. } = event {
            y.defendant_id.get_or_insert(*defendant_id);
        }
        y
    }
}

/// Register the defendant of a defence client, later registrations are ignored.
pub fn register_defence_client(
    y: DefenceClientState,
    defence_client_id: DefenceClientId,
    defendant_id: DefendantId,
) -> (DefenceClientState, Vec<LinkEvent>) {
    if y.defendant_id.is_some() {
        return (y, vec![]);
    }

    let events = vec![LinkEvent::DefenceClientRegistered {
        defence_client_id,
        defendant_id,
    }];
    (apply_all(y, &events), events)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use counsel_core::command::{LinkDefendant, RecordOffences};
    use counsel_core::{CaseId, DefenceClientId, DefendantId, InputError, LinkEvent, Offence};

    use super::{
        CaseLink, DefenceClientState, LinkState, link_defendant, record_offences,
        register_defence_client,
    };

    fn offence(code: &str) -> Offence {
        Offence {
            code: code.to_string(),
            title: format!("Offence {code}"),
            start_date: None,
        }
    }

    #[test]
    fn link_is_written_once() {
        let command = LinkDefendant {
            defendant_id: DefendantId::random(),
            defence_client_id: DefenceClientId::random(),
            case_id: CaseId::random(),
            offences: vec![offence("TH68001")],
        };

        let (y, events) = link_defendant(LinkState::default(), &command);
        assert_matches!(&events[..], [LinkEvent::DefendantLinkedToCase { .. }]);
        assert_eq!(
            y.resolve(),
            Some(CaseLink {
                case_id: command.case_id,
                defence_client_id: command.defence_client_id,
            })
        );

        let (y, events) = link_defendant(y, &command);
        assert!(events.is_empty());

        let relink = LinkDefendant {
            case_id: CaseId::random(),
            ..command.clone()
        };
        let (y, events) = link_defendant(y, &relink);
        assert_matches!(&events[..], [LinkEvent::DefendantLinkRejected { .. }]);
        assert_eq!(y.resolve().unwrap().case_id, command.case_id);
    }

    #[test]
    fn offences_latest_write_wins() {
        let defendant_id = DefendantId::random();
        let command = RecordOffences {
            defendant_id,
            offences: vec![offence("CJ03507")],
        };

        assert_eq!(
            record_offences(LinkState::default(), &command),
            Err(InputError::UnknownDefendant(defendant_id))
        );

        let (y, _) = link_defendant(
            LinkState::default(),
            &LinkDefendant {
                defendant_id,
                defence_client_id: DefenceClientId::random(),
                case_id: CaseId::random(),
                offences: vec![offence("TH68001")],
            },
        );
        let (y, events) = record_offences(y, &command).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(y.offences(), &[offence("CJ03507")]);
    }

    #[test]
    fn defence_client_registers_first_defendant() {
        let defence_client_id = DefenceClientId::random();
        let defendant_id = DefendantId::random();

        let (y, events) = register_defence_client(
            DefenceClientState::default(),
            defence_client_id,
            defendant_id,
        );
        assert_eq!(events.len(), 1);
        let (y, events) = register_defence_client(y, defence_client_id, DefendantId::random());
        assert!(events.is_empty());
        assert_eq!(y.defendant_for(), Some(defendant_id));
    }
}
