//! SeaORM entity models
//!
//! Database entities for the Colloquium site

mod choices;
mod timestamps;

mod researcher;
mod reference;
mod project;
mod project_collaborator;
mod event;
mod event_organizer;
mod talk;
mod talk_additional_speaker;
mod talk_reference;
mod post;
mod post_related_project;

pub use choices::{
    allowed_values, parse_choice, EventType, ProjectStatus, ReferenceType, TalkType,
};

pub use timestamps::publication_timestamp;

pub use researcher::{
    Entity as ResearcherEntity,
    Model as Researcher,
    ActiveModel as ResearcherActiveModel,
    Column as ResearcherColumn,
};

pub use reference::{
    Entity as ReferenceEntity,
    Model as Reference,
    ActiveModel as ReferenceActiveModel,
    Column as ReferenceColumn,
};

pub use project::{
    Entity as ProjectEntity,
    Model as Project,
    ActiveModel as ProjectActiveModel,
    Column as ProjectColumn,
};

pub use project_collaborator::{
    Entity as ProjectCollaboratorEntity,
    Model as ProjectCollaborator,
    ActiveModel as ProjectCollaboratorActiveModel,
    Column as ProjectCollaboratorColumn,
};

pub use event::{
    Entity as EventEntity,
    Model as Event,
    ActiveModel as EventActiveModel,
    Column as EventColumn,
};

pub use event_organizer::{
    Entity as EventOrganizerEntity,
    Model as EventOrganizer,
    ActiveModel as EventOrganizerActiveModel,
    Column as EventOrganizerColumn,
};

pub use talk::{
    Entity as TalkEntity,
    Model as Talk,
    ActiveModel as TalkActiveModel,
    Column as TalkColumn,
};

pub use talk_additional_speaker::{
    Entity as TalkAdditionalSpeakerEntity,
    Model as TalkAdditionalSpeaker,
    ActiveModel as TalkAdditionalSpeakerActiveModel,
    Column as TalkAdditionalSpeakerColumn,
};

pub use talk_reference::{
    Entity as TalkReferenceEntity,
    Model as TalkReference,
    ActiveModel as TalkReferenceActiveModel,
    Column as TalkReferenceColumn,
};

pub use post::{
    Entity as PostEntity,
    Model as Post,
    ActiveModel as PostActiveModel,
    Column as PostColumn,
};

pub use post_related_project::{
    Entity as PostRelatedProjectEntity,
    Model as PostRelatedProject,
    ActiveModel as PostRelatedProjectActiveModel,
    Column as PostRelatedProjectColumn,
};
