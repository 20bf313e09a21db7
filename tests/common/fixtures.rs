//! Sample manuscripts

/// Four-chapter novel excerpt with dialogue, filter words, passive
/// constructions and one repeated paragraph.
pub const NOVEL: &str = "\
Chapter 1: The Light

Elena Marsh climbed the lighthouse stairs. She felt the cold in her bones. \
She was tired, and she knew the lamp had to be lit before dark.

\"Are you coming up, Tomas?\" Elena Marsh called down the stairwell.

\"In a minute,\" Tomas Reed said. \"I am fixing the door.\"

The salt wind pushed against the glass for the whole of the long grey evening.

Chapter 2: The Storm

The storm came at midnight. The windows were shattered by the wind. \
Elena Marsh ran. She grabbed the rope. She pulled hard. The boat slammed \
into the rocks. Tomas Reed shouted. She jumped.

\"Hold the line!\" Tomas Reed shouted. \"Hold it, Elena!\"

She seemed to notice that the lamp was still burning. She was afraid.

Chapter 3: Morning

In the morning the beach was covered in wreckage. Elena Marsh walked the \
tide line and wondered what the storm had taken. She realized that Tomas \
Reed was gone. She felt empty.

The salt wind pushed against the glass for the whole of the long grey evening.

Chapter 4: The Letter

A letter was found in the lamp room. It was written by Tomas Reed. \
Elena Marsh read it twice. \"I had to go,\" the letter said. She watched \
the horizon until the light failed.
";

/// Markdown dissertation chapter set with frontmatter, APA and numeric
/// citations, hedged and overclaiming sentences.
pub const ACADEMIC: &str = "\
---
author: J. Okafor
kind: academic
genre: marine policy
---
# Chapter 1: Introduction

Coastal commons are governed by overlapping institutions (Ostrom, 1990). \
This study argues that tidal fisheries may perhaps possibly benefit from \
polycentric governance, although it could be argued that results might vary \
(Berkes, 2006). Prior work has examined community enforcement (Agrawal, 2001).

# Chapter 2: Methods

Data were collected from forty harbor councils over three seasons. Interviews \
were coded and themes were compared across sites. The sampling frame was \
constructed from registry records and cross-checked against landing reports.

# Chapter 3: Findings

The results clearly prove that local councils always outperform state agencies. \
This is undeniably the definitive answer to the governance question [1]. \
Enforcement costs fell in every site we visited [2].

# Chapter 4: Discussion

However, critics contend that council capture is a real risk (Ostrom, 1990). \
Nevertheless, the evidence suggests that layered oversight limits capture.
";
