/*!

This is the long-form manual for `vote_similarity` and `councilsim`.

## Similarity

For two councillors, only the votes where both took a position (yes or no)
are considered. The similarity is the number of these votes where they voted
the same way, divided by the number of these votes. Two councillors that never
voted on the same item, for instance a councillor who resigned and the
councillor elected in the by-election, have an undefined similarity. It is
stored as `null` and never as 0.

The similarity of a councillor with themselves is undefined.

## Vote entries

The entries of the sources are read with a closed table:

| Entry                                        | Meaning     |
|----------------------------------------------|-------------|
| `Yes`, `yes`, `YES`                          | affirmative |
| `No`, `no`, `NO`                             | negative    |
| `Consensus` (only with `acceptConsensus`)    | affirmative |
| `Absent`, `Vacant`, `Conflict of Interest`, `Conflict of interest`, empty | no position |

Any other entry stops the ingestion of the term with an error. Entries are
trimmed before being read.

## Input formats

The following providers are supported:
* `tmmis` member voting records of the City Clerk, one line per councillor and vote
* `scorecard_csv`, `scorecard_xlsx` scorecards of key votes, one row per seat

### `tmmis`

A CSV file with at least the columns `First Name`, `Last Name`, `Committee`,
`Agenda Item #`, `Motion Type`, `Vote Description`, `Date/Time`, `Result`
and `Vote`. Descriptions are often shared by several votes, so a vote is
identified by the agenda item, the motion type, the description, the result
and the date together.

Options:
- `committee` (string, optional): only keep the votes of this committee, for
  example `City Council`.
- `dropUnanimous` (boolean, optional): drop the votes where one side has no
  vote, as in `Carried, 25-0`.
- `excludeAgendaPattern` (string, optional): drop the agenda items that
  contain this text. Bills (`BL`) have descriptions too poor to tell the votes
  apart.

### `scorecard_csv` and `scorecard_xlsx`

The first row holds the names of the votes, in chronological order. Every
other row is a seat:

```text
Councillor,Budget 2023,Housing Now,Transit Expansion
"Olivia Chow
Mayor",Yes,Yes,Yes
Gary Crawford / Parthi Kandavel,No,Vacant,Yes
```

Only the first line of the councillor cell is kept. Columns without a name are
dropped. Columns without a name can still be used as the councillor column:
the column at position 3 (from 0) is named `Unnamed: 3`.

Options:
- `councillorColumn` (string, default `Councillor`): the column with the names.
- `dropColumns` (array of strings, optional): columns that are not votes.
- `dropRows` (array of numbers, optional): rows that are not seats, counted
  from 0 after the header.
- `excelWorksheetName` (string, optional): for Excel files, the worksheet to
  read. The first worksheet is used by default.

### Seats that changed hands

A seat held by two councillors during the term is written `First / Second`.
The seat changes hands at the first `Vacant` entry of the row: the first
councillor keeps the votes before it, the second councillor the votes from it
onward. A row without a `Vacant` entry, or that becomes vacant again after the
second councillor started voting, stops the ingestion of the term.

## Configuration

`councilsim` reads a JSON configuration:

```json
{
  "datasets": [{
    "name": "All Recorded Votes (TMMIS)",
    "terms": [{
      "term": "2022-2026",
      "anchors": ["Olivia Chow", "Ausma Malik"],
      "acceptConsensus": false,
      "sources": [{
        "provider": "tmmis",
        "filePath": "member-voting-record-2022-2026.csv",
        "committee": "City Council",
        "dropUnanimous": true,
        "excludeAgendaPattern": "BL",
        "renames": {"BailÃ£o": "Bailão"}
      }]
    }]
  }],
  "vacancies": {
    "2022-2026": {
      "Gary Crawford": {"reason": "earlyDeparture", "replacements": ["Parthi Kandavel"]}
    }
  },
  "vacanciesFile": "temporary_early_departures.csv"
}
```

- `anchors`: the mayor of the term, then the councillors used to break ties.
  Matrices are stored in this order.
- `sources`: several sources of the same term are merged, in the given order.
  They must agree on the votes they share.
- `renames` (map, optional): corrected spellings of names, applied before
  anything else.
- `vacancies`: the councillors that did not serve the full term, by term. The
  reason is `earlyDeparture` or `temporaryAppointment`. These councillors are
  hidden from the display unless requested with `--include`.
- `vacanciesFile` (optional): the same information as a CSV file with the
  columns `Term`, `Early Departures` and `Temporary Councillors`, names
  separated by `;`.

File paths are relative to the configuration file.

## Output

```json
{
  "failures": [{"dataset": "...", "term": "...", "error": "..."}],
  "results": [{
    "anchors": ["Olivia Chow", "Ausma Malik"],
    "councillors": ["Olivia Chow", "Ausma Malik", "..."],
    "dataset": "All Recorded Votes (TMMIS)",
    "digest": "<sha256 of the votes>",
    "scores": [[null, {"agreed": 412, "overlap": 430}], [{"agreed": 412, "overlap": 430}, null]],
    "term": "2022-2026",
    "vacancies": {}
  }]
}
```

A term that cannot be ingested is listed in `failures` and the other terms are
still processed. When this file is passed back with `--input`, the terms whose
votes have the same digest are not computed again.

 */
